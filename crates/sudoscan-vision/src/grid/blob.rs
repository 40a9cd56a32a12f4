// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Border-blob isolation: keep only the largest connected foreground region.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use sudoscan_core::config::StructuringElement;
use tracing::{debug, instrument};

use super::preprocess::{FOREGROUND, erode_with};

/// The surviving component of a binary mask.
#[derive(Debug, Clone)]
pub struct IsolatedBlob {
    /// Mask with only the largest component set to foreground.
    pub mask: GrayImage,
    /// Pixel count of that component, 0 when the input had no foreground.
    pub area: u32,
    /// First pixel of the component in raster order.
    pub seed: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Copy)]
struct Component {
    area: u32,
    seed: (u32, u32),
}

/// Keep the largest 4-connected foreground component of `mask`.
///
/// Pixels at or above 128 are foreground. When two components have the same
/// area, the one whose first pixel comes earlier in raster order wins.
pub fn isolate_largest(mask: &GrayImage) -> IsolatedBlob {
    let binary = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] >= 128 {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    });
    let labels = connected_components(&binary, Connectivity::Four, Luma([0u8]));

    let label_count = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut components: Vec<Option<Component>> = vec![None; label_count + 1];
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        components[label]
            .get_or_insert(Component { area: 0, seed: (x, y) })
            .area += 1;
    }

    let best = components
        .iter()
        .enumerate()
        .filter_map(|(label, c)| c.map(|c| (label, c)))
        .fold(None::<(usize, Component)>, |best, (label, c)| match best {
            Some((_, b)) if b.area > c.area => best,
            Some((_, b)) if b.area == c.area && raster_index(b.seed) < raster_index(c.seed) => best,
            _ => Some((label, c)),
        });

    let Some((keep, component)) = best else {
        debug!("No foreground components");
        return IsolatedBlob {
            mask: GrayImage::new(mask.width(), mask.height()),
            area: 0,
            seed: None,
        };
    };

    let isolated = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if labels.get_pixel(x, y).0[0] as usize == keep {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    });
    debug!(
        components = components.iter().flatten().count(),
        area = component.area,
        "Largest component isolated"
    );

    IsolatedBlob {
        mask: isolated,
        area: component.area,
        seed: Some(component.seed),
    }
}

/// Isolate the puzzle border: the largest component, eroded with the same
/// structuring element the preprocessor dilated with. `area` is measured
/// before erosion.
#[instrument(skip_all, fields(width = mask.width(), height = mask.height()))]
pub fn isolate_border(mask: &GrayImage, element: StructuringElement) -> IsolatedBlob {
    let blob = isolate_largest(mask);
    if blob.area == 0 {
        return blob;
    }
    IsolatedBlob {
        mask: erode_with(&blob.mask, element),
        ..blob
    }
}

fn raster_index((x, y): (u32, u32)) -> (u32, u32) {
    (y, x)
}
