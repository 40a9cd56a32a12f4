// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end tests of grid detection and rectification on synthetic photos.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp};
use sudoscan_core::SudoscanError;
use sudoscan_core::config::DetectionConfig;
use sudoscan_vision::{GridFinder, extract_glyphs};

const CANVAS: u32 = 400;
const ORIGIN: u32 = 50;
const SPAN: u32 = 300;

/// A printed 9x9 grid: 4 px outer frame, 2 px inner lines, spanning
/// `ORIGIN..ORIGIN + SPAN` on both axes of a white canvas.
fn printed_grid() -> GrayImage {
    let mut img = GrayImage::from_pixel(CANVAS, CANVAS, Luma([255u8]));
    for k in 0..=9u32 {
        let (pos, thickness) = match k {
            0 => (ORIGIN, 4),
            9 => (ORIGIN + SPAN - 4, 4),
            _ => (ORIGIN + k * SPAN / 9, 2),
        };
        for t in 0..thickness {
            for i in ORIGIN..ORIGIN + SPAN {
                img.put_pixel(pos + t, i, Luma([0]));
                img.put_pixel(i, pos + t, Luma([0]));
            }
        }
    }
    img
}

/// A plain black square frame with no inner lines.
fn plain_frame(thickness: u32) -> GrayImage {
    let mut img = GrayImage::from_pixel(CANVAS, CANVAS, Luma([255u8]));
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let inside = (ORIGIN..ORIGIN + SPAN).contains(&x) && (ORIGIN..ORIGIN + SPAN).contains(&y);
        let ring = x < ORIGIN + thickness
            || x >= ORIGIN + SPAN - thickness
            || y < ORIGIN + thickness
            || y >= ORIGIN + SPAN - thickness;
        if inside && ring {
            *pixel = Luma([0]);
        }
    }
    img
}

/// The four outer corners of the printed grid, TL, TR, BR, BL.
fn grid_corners() -> [(f32, f32); 4] {
    let (lo, hi) = (ORIGIN as f32, (ORIGIN + SPAN) as f32);
    [(lo, lo), (hi, lo), (hi, hi), (lo, hi)]
}

/// Warp the printed grid with `projection` and check the detected corners
/// land on the projected ground truth and the side on `expected_side`.
fn assert_rectifies_under(projection: Projection, expected_side: u32) {
    let photo = warp(
        &printed_grid(),
        &projection,
        Interpolation::Bilinear,
        Luma([255u8]),
    );
    let grid = GridFinder::with_defaults()
        .rectify(&DynamicImage::ImageLuma8(photo))
        .unwrap();

    assert_eq!(grid.image.width(), grid.image.height());
    assert_close(grid.side(), expected_side, 10);
    for (corner, truth) in grid
        .detection
        .corners
        .as_array()
        .iter()
        .zip(grid_corners().map(|p| projection * p))
    {
        assert!(
            (corner.x - truth.0 as f64).abs() < 10.0 && (corner.y - truth.1 as f64).abs() < 10.0,
            "corner {corner:?} too far from {truth:?}"
        );
    }
}

fn rotation_about_centre(degrees: f32) -> Projection {
    let centre = CANVAS as f32 / 2.0;
    Projection::translate(centre, centre)
        * Projection::rotate(degrees.to_radians())
        * Projection::translate(-centre, -centre)
}

fn assert_close(actual: u32, expected: u32, slack: u32) {
    assert!(
        actual.abs_diff(expected) <= slack,
        "expected {expected} +/- {slack}, got {actual}"
    );
}

#[test]
fn printed_grid_rectifies_to_its_span() {
    let image = DynamicImage::ImageLuma8(printed_grid());
    let grid = GridFinder::with_defaults().rectify(&image).unwrap();

    assert_eq!(grid.image.width(), grid.image.height());
    assert_close(grid.side(), SPAN, 10);
    assert!(grid.detection.lines.len() >= 8);

    let corners = grid.detection.corners;
    for (corner, (x, y)) in corners.as_array().iter().zip([
        (ORIGIN, ORIGIN),
        (ORIGIN + SPAN, ORIGIN),
        (ORIGIN + SPAN, ORIGIN + SPAN),
        (ORIGIN, ORIGIN + SPAN),
    ]) {
        assert!(
            (corner.x - x as f64).abs() < 8.0 && (corner.y - y as f64).abs() < 8.0,
            "corner {corner:?} too far from ({x}, {y})"
        );
    }
}

#[test]
fn blank_page_reports_no_foreground() {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(CANVAS, CANVAS, Luma([255u8])));
    let err = GridFinder::with_defaults().rectify(&image).unwrap_err();
    assert!(matches!(err, SudoscanError::NoForegroundFound));
}

#[test]
fn colour_photos_stay_in_colour() {
    let gray = printed_grid();
    let colour = RgbImage::from_fn(CANVAS, CANVAS, |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v.saturating_sub(20), v])
    });
    let grid = GridFinder::with_defaults()
        .rectify(&DynamicImage::ImageRgb8(colour))
        .unwrap();
    assert!(matches!(grid.image, DynamicImage::ImageRgb8(_)));
    assert_close(grid.side(), SPAN, 10);
}

#[test]
fn rectifying_a_rectified_grid_is_nearly_a_fixed_point() {
    let finder = GridFinder::with_defaults();
    let first = finder
        .rectify(&DynamicImage::ImageLuma8(printed_grid()))
        .unwrap();

    // Put the rectified grid back on a white page with a margin.
    let margin = 40;
    let side = first.side();
    let rectified = first.image.to_luma8();
    let mut page = GrayImage::from_pixel(side + 2 * margin, side + 2 * margin, Luma([255u8]));
    image::imageops::replace(&mut page, &rectified, margin as i64, margin as i64);

    let second = finder.rectify(&DynamicImage::ImageLuma8(page)).unwrap();
    assert_close(second.side(), side, 8);
}

#[test]
fn strict_line_count_rejects_the_grid() {
    let config = DetectionConfig::from_json(r#"{ "edges": { "min_lines": 500 } }"#).unwrap();
    let image = DynamicImage::ImageLuma8(printed_grid());
    let err = GridFinder::new(config).rectify(&image).unwrap_err();
    assert!(matches!(
        err,
        SudoscanError::InsufficientLines { required: 500, .. }
    ));
    assert!(err.is_not_found());
}

#[test]
fn rectified_empty_grid_has_no_glyphs() {
    let grid = GridFinder::with_defaults()
        .rectify(&DynamicImage::ImageLuma8(printed_grid()))
        .unwrap();
    let glyphs = extract_glyphs(&grid.image, &DetectionConfig::default().cells).unwrap();
    assert!(glyphs.is_empty(), "found {} glyphs", glyphs.len());
}

#[test]
fn plain_frame_has_too_few_lines() {
    for thickness in [2, 4, 8] {
        let image = DynamicImage::ImageLuma8(plain_frame(thickness));
        let err = GridFinder::with_defaults().rectify(&image).unwrap_err();
        assert!(
            matches!(
                err,
                SudoscanError::InsufficientLines {
                    found: 4,
                    required: 8
                }
            ),
            "thickness {thickness}: {err:?}"
        );
    }
}

#[test]
fn slightly_rotated_grids_are_straightened() {
    // -3° tilts the vertical borders to ~177°, across the angle wrap.
    for degrees in [3.0, -3.0] {
        assert_rectifies_under(rotation_about_centre(degrees), SPAN);
    }
}

#[test]
fn strongly_rotated_grids_are_straightened() {
    for degrees in [7.0, -7.0] {
        assert_rectifies_under(rotation_about_centre(degrees), SPAN);
    }
}

#[test]
fn perspective_skew_is_undone() {
    let skewed = [(70.0, 60.0), (330.0, 45.0), (360.0, 355.0), (40.0, 340.0)];
    let projection = Projection::from_control_points(grid_corners(), skewed).unwrap();
    // Longest side of the skewed quadrilateral: bottom edge, ~320 px.
    assert_rectifies_under(projection, 320);
}
