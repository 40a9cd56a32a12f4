// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing: blur, inverted local-mean threshold, dilation.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::definitions::Image;
use imageproc::filter::gaussian_blur_f32;
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::morphology::{dilate, erode};
use sudoscan_core::config::{KernelShape, PreprocessConfig, StructuringElement};
use tracing::{debug, instrument};

/// Foreground value in every binary mask produced by the pipeline.
pub const FOREGROUND: u8 = 255;

/// Turn a grayscale photograph into a binary mask where ink is foreground.
///
/// 1. Gaussian blur (`blur_sigma`)
/// 2. Inverted adaptive threshold against the local mean
/// 3. One dilation with the configured structuring element, closing small
///    gaps in the printed grid lines
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn preprocess(gray: &GrayImage, config: &PreprocessConfig) -> GrayImage {
    let blurred = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(gray, config.blur_sigma)
    } else {
        gray.clone()
    };
    debug!(sigma = config.blur_sigma, "Applied Gaussian blur");

    let binary = adaptive_threshold_inv(&blurred, config.block_radius, config.threshold_offset);
    let dilated = dilate_with(&binary, config.kernel);
    debug!(
        foreground = count_foreground(&dilated),
        "Thresholded and dilated"
    );
    dilated
}

/// Inverted mean adaptive threshold.
///
/// A pixel becomes foreground when it is at least `c` darker than the mean of
/// the `(2 * block_radius + 1)` square around it; everything else becomes
/// background. The neighbourhood is clamped at the image border.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_radius: u32, c: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral: Image<Luma<u64>> = integral_image(gray);

    GrayImage::from_fn(width, height, |x, y| {
        let (left, top) = (x.saturating_sub(block_radius), y.saturating_sub(block_radius));
        let right = x.saturating_add(block_radius).min(width - 1);
        let bottom = y.saturating_add(block_radius).min(height - 1);
        let [sum] = sum_image_pixels(&integral, left, top, right, bottom);
        let area = u64::from(right - left + 1) * u64::from(bottom - top + 1);

        let local_mean = (sum as f64 / area as f64).round() as i32;
        let pixel = gray.get_pixel(x, y).0[0] as i32;
        if pixel <= local_mean - c {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Dilate a binary mask with the given structuring element.
pub fn dilate_with(mask: &GrayImage, element: StructuringElement) -> GrayImage {
    dilate(mask, norm_for(element.shape), element.radius)
}

/// Erode a binary mask with the given structuring element.
pub fn erode_with(mask: &GrayImage, element: StructuringElement) -> GrayImage {
    erode(mask, norm_for(element.shape), element.radius)
}

/// Plus-shaped elements are L1 balls, square ones are L-infinity balls.
fn norm_for(shape: KernelShape) -> Norm {
    match shape {
        KernelShape::Plus => Norm::L1,
        KernelShape::Square => Norm::LInf,
    }
}

pub(crate) fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] >= 128).count()
}
