// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Sudoscan.

use thiserror::Error;

/// Top-level error type for all Sudoscan operations.
#[derive(Debug, Error)]
pub enum SudoscanError {
    // -- Grid detection --
    #[error("no foreground found: the frame contains no plausible grid")]
    NoForegroundFound,

    #[error("grid edges not found: {found} usable lines, need {required}")]
    InsufficientLines { found: usize, required: usize },

    #[error("degenerate grid geometry: {0}")]
    DegenerateGeometry(String),

    // -- Reading --
    #[error("digit classifier returned no confident answer")]
    ClassifierUncertain,

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    // -- Solving --
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    #[error("puzzle has no solution")]
    Unsatisfiable,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SudoscanError {
    /// True for the detection failures that mean "no grid in this frame".
    ///
    /// These are not fatal: the caller is expected to try another photo or
    /// camera frame.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SudoscanError::NoForegroundFound
                | SudoscanError::InsufficientLines { .. }
                | SudoscanError::DegenerateGeometry(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SudoscanError>;
