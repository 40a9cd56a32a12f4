// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid detection pipeline: preprocessing, border-blob isolation, Hough line
// extraction, line merging, edge classification and perspective rectification.

pub mod blob;
pub mod edges;
pub mod hough;
pub mod merge;
pub mod overlay;
pub mod preprocess;
pub mod rectify;

use image::{DynamicImage, GrayImage};
use serde::Serialize;
use sudoscan_core::config::DetectionConfig;
use sudoscan_core::error::{Result, SudoscanError};
use sudoscan_core::types::{CornerQuadrilateral, EdgeQuadruple, Line};
use tracing::{debug, info, instrument, warn};

use self::blob::isolate_border;
use self::edges::classify_edges;
use self::hough::detect_lines;
use self::merge::merge_close_lines;
use self::preprocess::preprocess;
use self::rectify::{corners, warp_to_square};

/// Everything the detector learned about the grid in one frame.
#[derive(Debug, Clone, Serialize)]
pub struct GridDetection {
    /// Pixel count of the isolated border blob.
    pub blob_area: u32,
    /// Candidate lines after merge passes are repeated until none fuse,
    /// strongest first.
    pub lines: Vec<Line>,
    pub edges: EdgeQuadruple,
    pub corners: CornerQuadrilateral,
    /// Isolated, eroded border mask the lines were extracted from.
    #[serde(skip)]
    pub mask: GrayImage,
}

/// A top-down square image of the puzzle plus the detection that produced it.
#[derive(Debug, Clone)]
pub struct RectifiedGrid {
    pub image: DynamicImage,
    pub detection: GridDetection,
}

impl RectifiedGrid {
    /// Side length of the square output, in pixels.
    pub fn side(&self) -> u32 {
        self.image.width()
    }
}

/// Locates a printed 9x9 grid in a photograph and rectifies it.
///
/// Each call is independent; the finder only holds its configuration.
#[derive(Debug, Clone, Default)]
pub struct GridFinder {
    config: DetectionConfig,
}

impl GridFinder {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// A finder using the tuned default thresholds.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run the detection pipeline up to the corner quadrilateral.
    ///
    /// ## Pipeline
    ///
    /// 1. Convert to grayscale
    /// 2. Blur, inverted adaptive threshold, dilation
    /// 3. Keep the largest connected blob and erode it
    /// 4. Hough line detection on the blob
    /// 5. Merge near-duplicate lines
    /// 6. Pick the top, bottom, left and right edges
    /// 7. Intersect the edges for the four corners
    ///
    /// Returns [`SudoscanError::NoForegroundFound`],
    /// [`SudoscanError::InsufficientLines`] or
    /// [`SudoscanError::DegenerateGeometry`] when the frame holds no usable
    /// grid. These are not fatal; try another frame.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<GridDetection> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(SudoscanError::ImageError(format!(
                "cannot search an empty {width}x{height} image"
            )));
        }

        let gray = image.to_luma8();
        let binary = preprocess(&gray, &self.config.preprocess);

        let blob = isolate_border(&binary, self.config.preprocess.kernel);
        if blob.area == 0 {
            warn!("No foreground in frame");
            return Err(SudoscanError::NoForegroundFound);
        }
        debug!(area = blob.area, seed = ?blob.seed, "Border blob isolated");

        let candidates: Vec<Line> = detect_lines(&blob.mask, &self.config.hough)
            .into_iter()
            .map(|hough| hough.line)
            .collect();
        let lines = merge_close_lines(&candidates, width, height, &self.config.merge);
        debug!(
            candidates = candidates.len(),
            merged = lines.len(),
            "Candidate lines merged"
        );

        let edges = classify_edges(&lines, &self.config.edges)?;
        let corners = corners(&edges, width, height)?;

        info!(lines = lines.len(), blob_area = blob.area, "Grid located");
        Ok(GridDetection {
            blob_area: blob.area,
            lines,
            edges,
            corners,
            mask: blob.mask,
        })
    }

    /// Detect the grid and warp it to a top-down square image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn rectify(&self, image: &DynamicImage) -> Result<RectifiedGrid> {
        let detection = self.detect(image)?;
        let rectified = warp_to_square(image, &detection.corners)?;
        Ok(RectifiedGrid {
            image: rectified,
            detection,
        })
    }

    /// Load an image from disk and rectify it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn rectify_path(&self, path: impl AsRef<std::path::Path>) -> Result<RectifiedGrid> {
        let image = image::open(path.as_ref()).map_err(|err| {
            SudoscanError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        self.rectify(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, RgbaImage};

    #[test]
    fn blank_frame_has_no_foreground() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 90, Luma([255u8])));
        let err = GridFinder::with_defaults().detect(&img).unwrap_err();
        assert!(matches!(err, SudoscanError::NoForegroundFound));
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let err = GridFinder::with_defaults().rectify(&img).unwrap_err();
        assert!(matches!(err, SudoscanError::ImageError(_)));
    }

    #[test]
    fn a_lone_stroke_is_not_a_grid() {
        let mut img = GrayImage::from_pixel(200, 200, Luma([255u8]));
        for x in 20..180 {
            for y in 98..102 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let err = GridFinder::with_defaults()
            .detect(&DynamicImage::ImageLuma8(img))
            .unwrap_err();
        assert!(matches!(err, SudoscanError::InsufficientLines { .. }));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = GridFinder::with_defaults()
            .rectify_path("/nonexistent/sudoku.png")
            .unwrap_err();
        assert!(matches!(err, SudoscanError::ImageError(_)));
    }
}
