// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sudoscan-vision: locate a printed 9x9 grid in a photograph and rectify it.
//
// The grid pipeline (preprocess, blob isolation, Hough lines, line merging,
// edge classification, perspective warp) lives in `grid`; per-cell glyph
// extraction and board reading live in `cells`. An OCR-backed digit
// classifier is available behind the `ocr` feature.

pub mod cells;
pub mod grid;

#[cfg(feature = "ocr")]
pub mod ocr;

// Re-export the primary entry points so callers can use `sudoscan_vision::GridFinder` etc.
pub use cells::{BoardReading, CellGlyph, extract_glyphs, read_board};
pub use grid::{GridDetection, GridFinder, RectifiedGrid};

#[cfg(feature = "ocr")]
pub use ocr::{ModelPaths, OcrDigitClassifier};
