// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Digit classifier backed by the `ocrs` engine (neural models run by `rten`).
//
// Enabled with the `ocr` feature. Two models are needed, a text detector and
// a text recogniser; `ocrs-cli` downloads both into `~/.cache/ocrs/` the
// first time it runs:
//
//   cargo install ocrs-cli
//   ocrs some-image.png

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use sudoscan_core::error::{Result, SudoscanError};
use sudoscan_core::traits::DigitClassifier;
use tracing::{debug, info, instrument};

const DETECTOR_FILE: &str = "text-detection.rten";
const RECOGNISER_FILE: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, else `$HOME/.cache/ocrs`, else a relative
/// `ocrs-models` directory.
pub fn model_directory() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(|cache| PathBuf::from(cache).join("ocrs"))
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache").join("ocrs"))
        })
        .unwrap_or_else(|| PathBuf::from("ocrs-models"))
}

/// Locations of the detector and recogniser models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub recogniser: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::in_dir(model_directory())
    }
}

impl ModelPaths {
    /// Both models under their standard file names in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detector: dir.join(DETECTOR_FILE),
            recogniser: dir.join(RECOGNISER_FILE),
        }
    }

    pub fn exist(&self) -> bool {
        self.detector.exists() && self.recogniser.exists()
    }

    fn check(&self) -> Result<()> {
        for (role, path) in [("detector", &self.detector), ("recogniser", &self.recogniser)] {
            if !path.exists() {
                return Err(SudoscanError::OcrError(format!(
                    "text {role} model missing at {}; run `ocrs-cli` once to fetch it",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn load_model(role: &str, path: &Path) -> Result<Model> {
    info!(role, path = %path.display(), "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        SudoscanError::OcrError(format!(
            "cannot load text {role} model {}: {err}",
            path.display()
        ))
    })
}

/// Reads a single printed digit per glyph.
///
/// Loading the models dominates the cost, so build one classifier per run
/// and hand it to every board read. `ocrs` and `rten` are very slow in debug
/// builds.
pub struct OcrDigitClassifier {
    engine: OcrEngine,
}

impl OcrDigitClassifier {
    #[instrument(skip_all)]
    pub fn new(paths: &ModelPaths) -> Result<Self> {
        paths.check()?;
        let params = OcrEngineParams {
            detection_model: Some(load_model("detector", &paths.detector)?),
            recognition_model: Some(load_model("recogniser", &paths.recogniser)?),
            ..Default::default()
        };
        let engine = OcrEngine::new(params)
            .map_err(|err| SudoscanError::OcrError(format!("OCR engine setup failed: {err}")))?;
        Ok(Self { engine })
    }

    /// Uses the models in [`model_directory`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(&ModelPaths::default())
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(&ModelPaths::in_dir(dir))
    }

    fn text_of(&self, glyph: &GrayImage) -> Result<String> {
        let rgb = DynamicImage::ImageLuma8(glyph.clone()).to_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|err| SudoscanError::OcrError(format!("bad glyph buffer: {err}")))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| SudoscanError::OcrError(format!("glyph preparation failed: {err}")))?;
        self.engine
            .get_text(&input)
            .map_err(|err| SudoscanError::OcrError(format!("recognition failed: {err}")))
    }
}

impl DigitClassifier for OcrDigitClassifier {
    #[instrument(skip_all, fields(size = glyph.width()))]
    fn classify(&self, glyph: &GrayImage) -> Result<u8> {
        let text = self.text_of(glyph)?;
        let digit = parse_digit(&text);
        debug!(text = %text.trim(), ?digit, "Glyph recognised");
        digit.ok_or(SudoscanError::ClassifierUncertain)
    }
}

/// Exactly one symbol in `1..=9` once whitespace is dropped.
fn parse_digit(text: &str) -> Option<u8> {
    let mut symbols = text.chars().filter(|c| !c.is_whitespace());
    match (symbols.next(), symbols.next()) {
        (Some(c @ '1'..='9'), None) => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_live_in_the_model_directory() {
        let paths = ModelPaths::default();
        assert_eq!(paths.detector, model_directory().join(DETECTOR_FILE));
        assert_eq!(paths.recogniser, model_directory().join(RECOGNISER_FILE));
    }

    #[test]
    fn missing_models_fail_before_loading() {
        let paths = ModelPaths::in_dir("/nonexistent/sudoscan-models");
        assert!(!paths.exist());
        assert!(matches!(paths.check(), Err(SudoscanError::OcrError(_))));
        assert!(matches!(
            OcrDigitClassifier::new(&paths),
            Err(SudoscanError::OcrError(_))
        ));
    }

    #[test]
    fn only_a_single_nonzero_digit_is_accepted() {
        assert_eq!(parse_digit("7"), Some(7));
        assert_eq!(parse_digit("  4\n"), Some(4));
        assert_eq!(parse_digit("0"), None);
        assert_eq!(parse_digit("17"), None);
        assert_eq!(parse_digit("l"), None);
        assert_eq!(parse_digit(""), None);
    }
}
