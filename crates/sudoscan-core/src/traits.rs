// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator traits. The grid pipeline only crops glyphs and hands boards
// over; recognition and solving live behind these seams.

use image::GrayImage;

use crate::error::Result;
use crate::types::Board;

/// Recognise a single printed digit.
pub trait DigitClassifier {
    /// Classify one glyph image (dark ink on a light background).
    ///
    /// Returns a digit in `1..=9`, or `SudoscanError::ClassifierUncertain`
    /// when there is no confident answer. Other errors are real failures.
    fn classify(&self, glyph: &GrayImage) -> Result<u8>;
}

/// Fill in a partially completed board.
pub trait PuzzleSolver {
    /// Returns the completed board, or `SudoscanError::Unsatisfiable`.
    fn solve(&self, board: &Board) -> Result<Board>;
}
