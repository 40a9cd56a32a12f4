// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration. Every default reproduces the tuned constants for
// phone-camera-resolution photographs.

use serde::{Deserialize, Serialize};

/// Shape of the structuring element used for dilation and erosion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelShape {
    /// Plus / cross shape (4-neighbourhood at radius 1).
    Plus,
    /// Full square (8-neighbourhood at radius 1).
    Square,
}

/// Structuring element shared by the dilation in preprocessing and the
/// matching erosion after blob isolation. Immutable for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringElement {
    pub shape: KernelShape,
    pub radius: u8,
}

impl StructuringElement {
    /// The 3x3 plus-shaped element `[0 1 0; 1 1 1; 0 1 0]`.
    pub const PLUS: Self = Self {
        shape: KernelShape::Plus,
        radius: 1,
    };
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self::PLUS
    }
}

/// Blur and binarisation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur sigma (2.0 matches an 11x11 kernel).
    pub blur_sigma: f32,
    /// Radius of the adaptive-threshold neighbourhood (2 = 5x5 block).
    pub block_radius: u32,
    /// Constant subtracted from the local mean.
    pub threshold_offset: i32,
    pub kernel: StructuringElement,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            block_radius: 2,
            threshold_offset: 2,
            kernel: StructuringElement::PLUS,
        }
    }
}

/// Hough transform parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Minimum accumulator votes for a candidate line.
    pub vote_threshold: u32,
    /// Non-maximum suppression radius in (offset px, angle degree) bins.
    pub suppression_radius: u32,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            vote_threshold: 200,
            suppression_radius: 8,
        }
    }
}

/// Tolerances deciding whether two candidate lines are the same edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeTolerances {
    /// Maximum offset difference in pixels (exclusive).
    pub max_offset_delta: f64,
    /// Maximum angle difference in degrees (exclusive).
    pub max_angle_delta_deg: f64,
    /// Maximum squared endpoint distance in px² (exclusive).
    pub max_endpoint_distance_sq: f64,
}

impl Default for MergeTolerances {
    fn default() -> Self {
        Self {
            max_offset_delta: 20.0,
            max_angle_delta_deg: 10.0,
            max_endpoint_distance_sq: 4096.0,
        }
    }
}

/// Boundary-edge selection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Fewer merged lines than this means the grid was not found.
    pub min_lines: usize,
    /// Angular band, in degrees, around the axis directions.
    pub family_tolerance_deg: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            min_lines: 8,
            family_tolerance_deg: 10.0,
        }
    }
}

/// Per-cell glyph extraction on the rectified grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    /// Sigma of the Gaussian-weighted local mean (15.5 ~ a 101 px block).
    pub threshold_sigma: f32,
    /// Constant subtracted from the Gaussian local mean.
    pub threshold_offset: i32,
    /// A cell with less foreground than this fraction of its area is empty.
    pub min_fill_ratio: f32,
    /// Glyph bounding-box height must exceed this fraction of the cell.
    pub min_glyph_height_ratio: f32,
    /// ...and stay below this one.
    pub max_glyph_height_ratio: f32,
    /// Blank border added around a glyph before classification.
    pub glyph_padding: u32,
    /// Side of the square image handed to the classifier.
    pub glyph_size: u32,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            threshold_sigma: 15.5,
            threshold_offset: 1,
            min_fill_ratio: 0.2,
            min_glyph_height_ratio: 0.5,
            max_glyph_height_ratio: 0.8,
            glyph_padding: 10,
            glyph_size: 75,
        }
    }
}

/// Full configuration of the grid-detection pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub preprocess: PreprocessConfig,
    pub hough: HoughConfig,
    pub merge: MergeTolerances,
    pub edges: EdgeConfig,
    pub cells: CellConfig,
}

impl DetectionConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = DetectionConfig::default();
        assert_eq!(config.hough.vote_threshold, 200);
        assert_eq!(config.merge.max_offset_delta, 20.0);
        assert_eq!(config.merge.max_angle_delta_deg, 10.0);
        assert_eq!(config.merge.max_endpoint_distance_sq, 4096.0);
        assert_eq!(config.edges.min_lines, 8);
        assert_eq!(config.preprocess.kernel, StructuringElement::PLUS);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            DetectionConfig::from_json(r#"{ "edges": { "min_lines": 4 } }"#).unwrap();
        assert_eq!(config.edges.min_lines, 4);
        assert_eq!(config.edges.family_tolerance_deg, 10.0);
        assert_eq!(config.hough.vote_threshold, 200);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = DetectionConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, crate::SudoscanError::Serialization(_)));
    }
}
