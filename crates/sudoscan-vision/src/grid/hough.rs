// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Straight-line extraction with a polar Hough transform.
//
// imageproc's `detect_lines` does not report vote counts, which the merger
// relies on for ordering, so the accumulator is built here and only the
// non-maximum suppression is delegated.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::suppress::suppress_non_maximum;
use serde::Serialize;
use sudoscan_core::config::HoughConfig;
use sudoscan_core::types::Line;
use tracing::{debug, instrument};

/// One-degree angle bins covering `[0°, 180°)`.
const ANGLE_BINS: u32 = 180;

/// A candidate line with its accumulator vote count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoughLine {
    pub line: Line,
    pub votes: u32,
}

/// Detect straight lines in a binary mask.
///
/// Every foreground pixel (value >= 128) votes once per angle bin for the
/// offset bin `round(x·cosθ + y·sinθ)`. Accumulator cells that are the
/// maximum of their `suppression_radius` neighbourhood (wrapping around the
/// angle axis) and reach `vote_threshold` become lines, sorted by descending
/// votes, then by angle, then by offset.
#[instrument(skip_all, fields(width = mask.width(), height = mask.height()))]
pub fn detect_lines(mask: &GrayImage, config: &HoughConfig) -> Vec<HoughLine> {
    let (width, height) = mask.dimensions();
    let max_offset = (width as f64).hypot(height as f64).ceil() as u32;
    let offset_bins = 2 * max_offset + 1;

    let trig: Vec<(f64, f64)> = (0..ANGLE_BINS)
        .map(|deg| (deg as f64).to_radians().sin_cos())
        .collect();

    let mut accumulator = vec![0u32; (ANGLE_BINS * offset_bins) as usize];
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] < 128 {
            continue;
        }
        let (fx, fy) = (x as f64, y as f64);
        for (deg, &(sin, cos)) in trig.iter().enumerate() {
            let r = (fx * cos + fy * sin).round() as i64;
            let bin = (r + max_offset as i64) as usize;
            accumulator[deg * offset_bins as usize + bin] += 1;
        }
    }

    // The angle axis wraps: (r, θ) and (-r, θ + 180°) are the same line, so
    // the suppression window must see across 0°/180°. Pad both sides with
    // mirrored columns and only report peaks from the unpadded range.
    let pad = config.suppression_radius.min(ANGLE_BINS / 2);
    let padded: ImageBuffer<Luma<u32>, Vec<u32>> =
        ImageBuffer::from_fn(ANGLE_BINS + 2 * pad, offset_bins, |col, bin| {
            let deg = col as i64 - pad as i64;
            let (deg, bin) = if deg < 0 {
                (deg + ANGLE_BINS as i64, offset_bins - 1 - bin)
            } else if deg >= ANGLE_BINS as i64 {
                (deg - ANGLE_BINS as i64, offset_bins - 1 - bin)
            } else {
                (deg, bin)
            };
            Luma([accumulator[deg as usize * offset_bins as usize + bin as usize]])
        });

    let peaks = suppress_non_maximum(&padded, config.suppression_radius);
    let mut lines: Vec<HoughLine> = (0..ANGLE_BINS)
        .flat_map(|deg| (0..offset_bins).map(move |bin| (deg, bin)))
        .filter_map(|(deg, bin)| {
            let votes = peaks.get_pixel(deg + pad, bin).0[0];
            (votes > 0 && votes >= config.vote_threshold).then(|| HoughLine {
                line: Line::from_degrees(bin as f64 - max_offset as f64, deg as f64),
                votes,
            })
        })
        .collect();

    lines.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then(a.line.angle().total_cmp(&b.line.angle()))
            .then(a.line.offset().total_cmp(&b.line.offset()))
    });

    debug!(
        line_count = lines.len(),
        vote_threshold = config.vote_threshold,
        "Hough lines detected"
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vote_threshold: u32) -> HoughConfig {
        HoughConfig {
            vote_threshold,
            ..HoughConfig::default()
        }
    }

    #[test]
    fn empty_mask_has_no_lines() {
        let lines = detect_lines(&GrayImage::new(64, 64), &config(1));
        assert!(lines.is_empty());
    }

    #[test]
    fn finds_axis_aligned_lines_strongest_first() {
        let mut mask = GrayImage::new(200, 200);
        for x in 0..200 {
            mask.put_pixel(x, 100, Luma([255]));
        }
        for y in 20..170 {
            mask.put_pixel(40, y, Luma([255]));
        }

        let lines = detect_lines(&mask, &config(120));
        assert_eq!(lines.len(), 2, "got {lines:?}");

        let horizontal = lines[0];
        assert_eq!(horizontal.votes, 200);
        assert!((horizontal.line.angle_degrees() - 90.0).abs() < 1e-9);
        assert!((horizontal.line.offset() - 100.0).abs() < 1e-9);

        let vertical = lines[1];
        assert_eq!(vertical.votes, 150);
        assert!(vertical.line.angle_degrees().abs() < 1e-9);
        assert!((vertical.line.offset() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_filters_short_lines() {
        let mut mask = GrayImage::new(100, 100);
        for x in 10..60 {
            mask.put_pixel(x, 30, Luma([255]));
        }
        assert!(detect_lines(&mask, &config(200)).is_empty());
        assert_eq!(detect_lines(&mask, &config(50)).len(), 1);
    }

    #[test]
    fn near_vertical_duplicates_are_suppressed_across_the_wrap() {
        // A 5 px wide vertical band also scores well at 179° with a negative
        // offset; only the 0° line may survive.
        let mut mask = GrayImage::new(300, 400);
        for y in 40..380 {
            for x in 100..105 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let lines = detect_lines(&mask, &config(200));
        assert_eq!(lines.len(), 1, "got {lines:?}");
        assert!(lines[0].line.angle_degrees().abs() < 1e-9);
        assert!((100.0..105.0).contains(&lines[0].line.offset()));
    }

    #[test]
    fn dark_pixels_do_not_vote() {
        let mask = GrayImage::from_pixel(50, 50, Luma([127]));
        assert!(detect_lines(&mask, &config(1)).is_empty());
    }
}
