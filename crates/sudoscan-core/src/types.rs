// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Sudoscan: polar lines, grid edges and corners, and
// the 9x9 board.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SudoscanError;

/// A point in image coordinates (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

/// Which way a line runs across the image.
///
/// Decided once from the line's normal angle and used for every Cartesian
/// computation, so no branch ever divides by a near-zero sine or cosine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Normal within 45° of the y axis; parameterised by x.
    Horizontal,
    /// Normal within 45° of the x axis; parameterised by y.
    Vertical,
}

/// A straight line in polar form: `x·cos(angle) + y·sin(angle) = offset`.
///
/// `angle` is the direction of the line's normal in radians and is always in
/// `[0, π)`; `offset` is the signed perpendicular distance from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    offset: f64,
    angle: f64,
}

impl Line {
    /// Build a line, normalising `angle` into `[0, π)`.
    ///
    /// Wrapping the normal by π flips its direction, so the offset is negated
    /// on every odd wrap. Both scan directions of one edge compare equal.
    pub fn new(offset: f64, angle: f64) -> Self {
        let turns = (angle / PI).floor();
        let mut angle = angle - turns * PI;
        let mut offset = if (turns as i64).rem_euclid(2) == 1 {
            -offset
        } else {
            offset
        };
        // Float error can leave the wrapped angle exactly on π.
        if angle >= PI {
            angle -= PI;
            offset = -offset;
        }
        Self { offset, angle }
    }

    pub fn from_degrees(offset: f64, degrees: f64) -> Self {
        Self::new(offset, degrees.to_radians())
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    pub fn orientation(&self) -> Orientation {
        if self.angle.sin() >= self.angle.cos().abs() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Two points on the line where it meets the image frame.
    ///
    /// Horizontal lines are evaluated at `x = 0` and `x = width`, vertical
    /// lines at `y = 0` and `y = height`.
    pub fn endpoints(&self, width: u32, height: u32) -> (Point, Point) {
        self.endpoints_along(self.orientation(), width, height)
    }

    /// Like [`Line::endpoints`] but parameterised by a caller-chosen
    /// orientation, so two lines can be compared on the same frame borders.
    pub fn endpoints_along(&self, orientation: Orientation, width: u32, height: u32) -> (Point, Point) {
        let (sin, cos) = self.angle.sin_cos();
        match orientation {
            Orientation::Horizontal => {
                let w = width as f64;
                (
                    Point::new(0.0, self.offset / sin),
                    Point::new(w, (self.offset - w * cos) / sin),
                )
            }
            Orientation::Vertical => {
                let h = height as f64;
                (
                    Point::new(self.offset / cos, 0.0),
                    Point::new((self.offset - h * sin) / cos, h),
                )
            }
        }
    }

    /// Where the line crosses `y = 0`. Meaningful for vertical lines.
    pub fn x_intercept(&self) -> f64 {
        self.offset / self.angle.cos()
    }

    /// Where the line crosses `x = 0`. Meaningful for horizontal lines.
    pub fn y_intercept(&self) -> f64 {
        self.offset / self.angle.sin()
    }

    /// Arithmetic mean of both parameters.
    pub fn mean(&self, other: &Line) -> Line {
        Line::new(
            (self.offset + other.offset) / 2.0,
            (self.angle + other.angle) / 2.0,
        )
    }
}

/// The four outer boundary lines of the puzzle, each taken from the
/// detected line set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeQuadruple {
    pub top: Line,
    pub bottom: Line,
    pub left: Line,
    pub right: Line,
}

/// Corners of the puzzle in the source image, in clockwise order from the
/// top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerQuadrilateral {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl CornerQuadrilateral {
    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn as_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Length of the longest of the four sides.
    pub fn longest_side(&self) -> f64 {
        let corners = self.as_array();
        (0..4)
            .map(|i| corners[i].distance_sq(&corners[(i + 1) % 4]))
            .fold(0.0, f64::max)
            .sqrt()
    }
}

/// Side length of the board.
pub const BOARD_SIZE: usize = 9;

/// A 9x9 sudoku board. `0` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a board from rows, rejecting values above 9.
    pub fn from_rows(cells: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Result<Self, SudoscanError> {
        if let Some(bad) = cells.iter().flatten().find(|&&v| v > 9) {
            return Err(SudoscanError::InvalidBoard(format!(
                "cell value {bad} is outside 0..=9"
            )));
        }
        Ok(Self { cells })
    }

    pub fn rows(&self) -> &[[u8; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    /// Set a cell. Values above 9 are rejected.
    pub fn set(&mut self, row: usize, col: usize, value: u8) -> Result<(), SudoscanError> {
        if value > 9 {
            return Err(SudoscanError::InvalidBoard(format!(
                "cell value {value} is outside 0..=9"
            )));
        }
        self.cells[row][col] = value;
        Ok(())
    }

    /// Number of filled cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    pub fn is_complete(&self) -> bool {
        self.filled() == BOARD_SIZE * BOARD_SIZE
    }

    /// First empty cell in row-major order, if any.
    pub fn next_empty(&self) -> Option<(usize, usize)> {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
            .find(|&(row, col)| self.cells[row][col] == 0)
    }

    /// Digits that may legally go into `(row, col)` given its row, column
    /// and 3x3 box. The cell's own value is ignored.
    pub fn candidates(&self, row: usize, col: usize) -> Vec<u8> {
        let mut used = [false; 10];
        let (box_row, box_col) = (row / 3 * 3, col / 3 * 3);
        for i in 0..BOARD_SIZE {
            if i != col {
                used[self.cells[row][i] as usize] = true;
            }
            if i != row {
                used[self.cells[i][col] as usize] = true;
            }
            let (r, c) = (box_row + i / 3, box_col + i % 3);
            if (r, c) != (row, col) {
                used[self.cells[r][c] as usize] = true;
            }
        }
        (1..=9u8).filter(|&d| !used[d as usize]).collect()
    }

    /// True when no filled cell repeats a digit in its row, column or box.
    pub fn is_consistent(&self) -> bool {
        (0..BOARD_SIZE).all(|row| {
            (0..BOARD_SIZE).all(|col| {
                let value = self.cells[row][col];
                value == 0 || self.candidates(row, col).contains(&value)
            })
        })
    }
}

impl FromStr for Board {
    type Err = SudoscanError;

    /// Parse 81 cells in row-major order. Digits `1`-`9` are givens, `0` or
    /// `.` are empty; whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if symbols.len() != BOARD_SIZE * BOARD_SIZE {
            return Err(SudoscanError::InvalidBoard(format!(
                "expected 81 cells, got {}",
                symbols.len()
            )));
        }
        let mut board = Board::empty();
        for (i, symbol) in symbols.into_iter().enumerate() {
            let value = match symbol {
                '.' => 0,
                c => c.to_digit(10).ok_or_else(|| {
                    SudoscanError::InvalidBoard(format!("unexpected symbol {c:?} at cell {i}"))
                })? as u8,
            };
            board.cells[i / BOARD_SIZE][i % BOARD_SIZE] = value;
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for value in row {
                match value {
                    0 => f.write_str(".")?,
                    v => write!(f, "{v}")?,
                }
            }
        }
        Ok(())
    }
}
