// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner intersection and perspective warp to a square.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use sudoscan_core::error::{Result, SudoscanError};
use sudoscan_core::types::{CornerQuadrilateral, EdgeQuadruple, Line, Point};
use tracing::{debug, info, instrument};

/// Determinants below this mean the two lines are (nearly) parallel.
const PARALLEL_EPSILON: f64 = 1e-6;

/// Absorbs float noise so that a side of exactly `n` px is not floored to `n - 1`.
const SIDE_EPSILON: f64 = 1e-6;

/// A line as `a·x + b·y = c` with `(a, b)` of unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardForm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl StandardForm {
    /// Build from the line's two frame endpoints:
    /// `(a, b, c) = (y2 - y1, x1 - x2, a·x1 + b·y1)`, then normalised.
    pub fn from_line(line: &Line, width: u32, height: u32) -> Result<Self> {
        let (p1, p2) = line.endpoints(width, height);
        let a = p2.y - p1.y;
        let b = p1.x - p2.x;
        let norm = a.hypot(b);
        if !norm.is_finite() || norm < PARALLEL_EPSILON {
            return Err(SudoscanError::DegenerateGeometry(format!(
                "line (offset {:.1}, angle {:.1}°) has coincident endpoints",
                line.offset(),
                line.angle_degrees()
            )));
        }
        let (a, b) = (a / norm, b / norm);
        Ok(Self {
            a,
            b,
            c: a * p1.x + b * p1.y,
        })
    }
}

/// Intersect two lines by Cramer's rule.
pub fn intersect(first: &Line, second: &Line, width: u32, height: u32) -> Result<Point> {
    let l1 = StandardForm::from_line(first, width, height)?;
    let l2 = StandardForm::from_line(second, width, height)?;

    let det = l1.a * l2.b - l2.a * l1.b;
    if det.abs() < PARALLEL_EPSILON {
        return Err(SudoscanError::DegenerateGeometry(format!(
            "lines at {:.1}° and {:.1}° are parallel",
            first.angle_degrees(),
            second.angle_degrees()
        )));
    }

    Ok(Point::new(
        (l2.b * l1.c - l1.b * l2.c) / det,
        (l1.a * l2.c - l2.a * l1.c) / det,
    ))
}

/// Corners of the puzzle: left∩top, right∩top, right∩bottom, left∩bottom.
pub fn corners(edges: &EdgeQuadruple, width: u32, height: u32) -> Result<CornerQuadrilateral> {
    let quad = CornerQuadrilateral {
        top_left: intersect(&edges.left, &edges.top, width, height)?,
        top_right: intersect(&edges.right, &edges.top, width, height)?,
        bottom_right: intersect(&edges.right, &edges.bottom, width, height)?,
        bottom_left: intersect(&edges.left, &edges.bottom, width, height)?,
    };
    debug!(
        top_left = ?quad.top_left,
        top_right = ?quad.top_right,
        bottom_right = ?quad.bottom_right,
        bottom_left = ?quad.bottom_left,
        "Quadrilateral corners computed"
    );
    Ok(quad)
}

/// Output side length: the floor of the quadrilateral's longest side.
pub fn square_side(quad: &CornerQuadrilateral) -> Result<u32> {
    let longest = quad.longest_side();
    if !longest.is_finite() || longest > u32::MAX as f64 {
        return Err(SudoscanError::DegenerateGeometry(format!(
            "corner quadrilateral side {longest} is out of range"
        )));
    }
    let side = (longest + SIDE_EPSILON).floor() as u32;
    if side < 2 {
        return Err(SudoscanError::DegenerateGeometry(format!(
            "corner quadrilateral is too small ({longest:.2} px)"
        )));
    }
    Ok(side)
}

/// Warp the quadrilateral `quad` of `image` onto an `s x s` square.
///
/// `{TL, TR, BR, BL}` map to `{(0,0), (s-1,0), (s-1,s-1), (0,s-1)}` with
/// bilinear resampling. Grayscale and colour inputs keep their colour type
/// (other layouts are resampled as RGB8); pixels that fall outside the source
/// are white.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn warp_to_square(image: &DynamicImage, quad: &CornerQuadrilateral) -> Result<DynamicImage> {
    let side = square_side(quad)?;
    let far = (side - 1) as f32;

    let src = quad.as_array().map(|p| (p.x as f32, p.y as f32));
    let dst = [(0.0, 0.0), (far, 0.0), (far, far), (0.0, far)];
    let projection = Projection::from_control_points(src, dst).ok_or_else(|| {
        SudoscanError::DegenerateGeometry("perspective transform is not invertible".into())
    })?;

    let warped = match image {
        DynamicImage::ImageLuma8(gray) => {
            let mut out = GrayImage::new(side, side);
            warp_into(gray, &projection, Interpolation::Bilinear, Luma([255u8]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageRgba8(rgba) => {
            let mut out = RgbaImage::new(side, side);
            warp_into(
                rgba,
                &projection,
                Interpolation::Bilinear,
                Rgba([255u8, 255, 255, 255]),
                &mut out,
            );
            DynamicImage::ImageRgba8(out)
        }
        other => {
            let rgb = other.to_rgb8();
            let mut out = RgbImage::new(side, side);
            warp_into(&rgb, &projection, Interpolation::Bilinear, Rgb([255u8, 255, 255]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
    };

    info!(side, "Perspective correction applied");
    Ok(warped)
}
