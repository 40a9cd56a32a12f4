// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cell segmentation of a rectified grid and board reading.
//
// The rectified square is re-binarised, cut into 9x9 cells, and every cell
// with enough ink yields one glyph: the largest blob of digit-like height,
// normalised to a fixed-size dark-on-light image for the classifier.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::Serialize;
use sudoscan_core::config::CellConfig;
use sudoscan_core::error::{Result, SudoscanError};
use sudoscan_core::traits::DigitClassifier;
use sudoscan_core::types::{BOARD_SIZE, Board};
use tracing::{debug, info, instrument, warn};

use crate::grid::preprocess::FOREGROUND;

/// A normalised glyph cropped from one cell.
#[derive(Debug, Clone)]
pub struct CellGlyph {
    pub row: usize,
    pub col: usize,
    /// Dark ink on a white background, `glyph_size` square.
    pub image: GrayImage,
}

/// A board read from a rectified grid.
#[derive(Debug, Clone, Serialize)]
pub struct BoardReading {
    pub board: Board,
    /// Cells that held a glyph the classifier could not read; left empty.
    pub uncertain: Vec<(usize, usize)>,
}

/// Inverted Gaussian-weighted adaptive threshold of the rectified image.
///
/// A pixel is foreground when it is at least `threshold_offset` darker than
/// its Gaussian-weighted neighbourhood mean.
pub fn binarize_rectified(gray: &GrayImage, config: &CellConfig) -> GrayImage {
    let local_mean = if config.threshold_sigma > 0.0 {
        gaussian_blur_f32(gray, config.threshold_sigma)
    } else {
        gray.clone()
    };
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0] as i32;
        let mean = local_mean.get_pixel(x, y).0[0] as i32;
        if pixel <= mean - config.threshold_offset {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Side length of one cell (integer division of the square side by 9).
pub fn cell_size(side: u32) -> u32 {
    side / BOARD_SIZE as u32
}

/// Find the digit glyph in one binarised cell.
///
/// Empty cells (foreground not above `min_fill_ratio` of the area) and cells
/// without a blob of digit-like height return `None`. The chosen blob is the
/// largest 4-connected component whose area exceeds half the cell side and
/// whose bounding-box height lies strictly between the two height ratios.
pub fn cell_glyph(cell: &GrayImage, config: &CellConfig) -> Option<GrayImage> {
    let (width, height) = cell.dimensions();
    let size = width.max(height) as f32;
    let ink = cell.pixels().filter(|p| p.0[0] >= 128).count() as f32;
    if ink <= (width * height) as f32 * config.min_fill_ratio {
        return None;
    }

    let labels = connected_components(cell, Connectivity::Four, Luma([0u8]));
    let label_count = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut boxes: Vec<Option<BlobBox>> = vec![None; label_count + 1];
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label != 0 {
            boxes[label]
                .get_or_insert(BlobBox::at(x, y))
                .extend(x, y);
        }
    }

    let min_height = size * config.min_glyph_height_ratio;
    let max_height = size * config.max_glyph_height_ratio;
    let (label, bounds) = boxes
        .iter()
        .enumerate()
        .filter_map(|(label, b)| b.map(|b| (label, b)))
        .filter(|(_, b)| {
            let h = b.height() as f32;
            b.area as f32 > size / 2.0 && h > min_height && h < max_height
        })
        .fold(None::<(usize, BlobBox)>, |best, (label, b)| match best {
            Some((_, current)) if current.area >= b.area => best,
            _ => Some((label, b)),
        })?;

    let crop = GrayImage::from_fn(bounds.width(), bounds.height(), |x, y| {
        let inside = labels.get_pixel(bounds.min_x + x, bounds.min_y + y).0[0] as usize == label;
        if inside { Luma([0]) } else { Luma([255]) }
    });
    Some(normalise_glyph(&crop, config))
}

/// Pad the crop with a white border and scale it to the classifier's size.
fn normalise_glyph(crop: &GrayImage, config: &CellConfig) -> GrayImage {
    let pad = config.glyph_padding;
    let mut padded = GrayImage::from_pixel(
        crop.width() + 2 * pad,
        crop.height() + 2 * pad,
        Luma([255u8]),
    );
    imageops::replace(&mut padded, crop, pad as i64, pad as i64);
    imageops::resize(&padded, config.glyph_size, config.glyph_size, FilterType::Triangle)
}

/// Cut the rectified grid into cells and return a glyph for every non-empty
/// cell, in row-major order.
#[instrument(skip_all, fields(width = rectified.width(), height = rectified.height()))]
pub fn extract_glyphs(rectified: &DynamicImage, config: &CellConfig) -> Result<Vec<CellGlyph>> {
    let gray = rectified.to_luma8();
    let side = gray.width().min(gray.height());
    let cell = cell_size(side);
    if cell == 0 {
        return Err(SudoscanError::DegenerateGeometry(format!(
            "rectified image {}x{} is too small for 9x9 cells",
            gray.width(),
            gray.height()
        )));
    }

    let binary = binarize_rectified(&gray, config);
    let mut glyphs = Vec::new();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let x = col as u32 * cell;
            let y = row as u32 * cell;
            let w = cell.min(binary.width() - x);
            let h = cell.min(binary.height() - y);
            let crop = imageops::crop_imm(&binary, x, y, w, h).to_image();
            if let Some(image) = cell_glyph(&crop, config) {
                glyphs.push(CellGlyph { row, col, image });
            }
        }
    }

    debug!(cell, glyphs = glyphs.len(), "Cells segmented");
    Ok(glyphs)
}

/// Read the board from a rectified grid.
///
/// Cells without a glyph are 0. When the classifier reports
/// [`SudoscanError::ClassifierUncertain`] (or answers outside `1..=9`) the
/// cell stays 0 and is listed in [`BoardReading::uncertain`]; any other
/// classifier error aborts the read.
#[instrument(skip_all)]
pub fn read_board(
    rectified: &DynamicImage,
    classifier: &dyn DigitClassifier,
    config: &CellConfig,
) -> Result<BoardReading> {
    let mut board = Board::empty();
    let mut uncertain = Vec::new();

    for glyph in extract_glyphs(rectified, config)? {
        match classifier.classify(&glyph.image) {
            Ok(digit @ 1..=9) => board.set(glyph.row, glyph.col, digit)?,
            Ok(other) => {
                warn!(row = glyph.row, col = glyph.col, digit = other, "Classifier answer out of range");
                uncertain.push((glyph.row, glyph.col));
            }
            Err(SudoscanError::ClassifierUncertain) => {
                debug!(row = glyph.row, col = glyph.col, "Glyph not recognised");
                uncertain.push((glyph.row, glyph.col));
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        filled = board.filled(),
        uncertain = uncertain.len(),
        "Board read"
    );
    Ok(BoardReading { board, uncertain })
}

/// Bounding box and pixel count of one labelled blob.
#[derive(Debug, Clone, Copy)]
struct BlobBox {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
}

impl BlobBox {
    fn at(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
        }
    }

    fn extend(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
    }

    fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}
