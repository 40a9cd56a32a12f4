// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sudoscan-solver: depth-first backtracking over row, column and box
// candidates.

pub mod backtrack;

pub use backtrack::{BacktrackingSolver, SolveStats};
