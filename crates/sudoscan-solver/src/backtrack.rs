// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain backtracking solver.

use serde::Serialize;
use sudoscan_core::error::{Result, SudoscanError};
use sudoscan_core::traits::PuzzleSolver;
use sudoscan_core::types::Board;
use tracing::{debug, info, instrument, warn};

/// Counters from one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolveStats {
    /// Digits placed, including ones later undone.
    pub placements: u64,
    /// Placements undone after their subtree failed.
    pub backtracks: u64,
}

/// Depth-first search: fill the first empty cell (row-major) with each legal
/// candidate in ascending order and recurse.
///
/// The givens are checked for row, column and box conflicts before the
/// search starts, so an inconsistent board is reported as
/// [`SudoscanError::InvalidBoard`] rather than searched exhaustively.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingSolver;

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self
    }

    /// Solve and also report search statistics.
    #[instrument(skip_all, fields(givens = board.filled()))]
    pub fn solve_with_stats(&self, board: &Board) -> Result<(Board, SolveStats)> {
        if !board.is_consistent() {
            warn!("Givens conflict");
            return Err(SudoscanError::InvalidBoard(
                "a digit repeats in a row, column or box".into(),
            ));
        }

        let mut work = *board;
        let mut stats = SolveStats::default();
        if search(&mut work, &mut stats)? {
            info!(
                placements = stats.placements,
                backtracks = stats.backtracks,
                "Puzzle solved"
            );
            Ok((work, stats))
        } else {
            debug!(placements = stats.placements, "Search exhausted");
            Err(SudoscanError::Unsatisfiable)
        }
    }
}

impl PuzzleSolver for BacktrackingSolver {
    fn solve(&self, board: &Board) -> Result<Board> {
        self.solve_with_stats(board).map(|(solved, _)| solved)
    }
}

fn search(board: &mut Board, stats: &mut SolveStats) -> Result<bool> {
    let Some((row, col)) = board.next_empty() else {
        return Ok(true);
    };

    for digit in board.candidates(row, col) {
        board.set(row, col, digit)?;
        stats.placements += 1;
        if search(board, stats)? {
            return Ok(true);
        }
        board.set(row, col, 0)?;
        stats.backtracks += 1;
    }
    Ok(false)
}
