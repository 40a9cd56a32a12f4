// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sudoscan: core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod traits;
pub mod types;

pub use config::DetectionConfig;
pub use error::SudoscanError;
pub use traits::{DigitClassifier, PuzzleSolver};
pub use types::*;
