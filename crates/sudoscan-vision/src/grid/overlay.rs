// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug rendering of detected lines and the chosen grid edges.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use sudoscan_core::types::{EdgeQuadruple, Line};

const CANDIDATE: Rgb<u8> = Rgb([220, 40, 40]);
const EDGE: Rgb<u8> = Rgb([40, 200, 60]);

/// Draw every line in `lines` (red) and, if given, the four grid edges
/// (green) over an RGB copy of `mask`.
pub fn draw_lines(mask: &GrayImage, lines: &[Line], edges: Option<&EdgeQuadruple>) -> RgbImage {
    let (width, height) = mask.dimensions();
    let mut canvas = RgbImage::from_fn(width, height, |x, y| {
        let v = mask.get_pixel(x, y).0[0] / 2;
        Rgb([v, v, v])
    });

    for line in lines {
        draw_line(&mut canvas, line, CANDIDATE);
    }
    if let Some(edges) = edges {
        for line in [&edges.top, &edges.bottom, &edges.left, &edges.right] {
            draw_line(&mut canvas, line, EDGE);
        }
    }
    canvas
}

fn draw_line(canvas: &mut RgbImage, line: &Line, colour: Rgb<u8>) {
    let (p1, p2) = line.endpoints(canvas.width(), canvas.height());
    draw_line_segment_mut(
        canvas,
        (p1.x as f32, p1.y as f32),
        (p2.x as f32, p2.y as f32),
        colour,
    );
}
