// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people pointing a phone at a puzzle.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Detection failures are retriable: the caller should take another photo.

use crate::error::SudoscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Bad frame. Another photo will probably work.
    Transient,
    /// User must do something (fix a board string, pick another file).
    ActionRequired,
    /// Retrying won't help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying with a new photo is worthwhile.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `SudoscanError` into a `HumanError`.
pub fn humanize_error(err: &SudoscanError) -> HumanError {
    match err {
        // -- Grid detection --
        SudoscanError::NoForegroundFound => HumanError {
            message: "We couldn't see a puzzle in this photo.".into(),
            suggestion: "Make sure the whole puzzle is in the picture and the room is well lit.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SudoscanError::InsufficientLines { .. } => HumanError {
            message: "We couldn't find the edges of the puzzle.".into(),
            suggestion: "Hold the camera straight above the puzzle so all four borders are clearly visible.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SudoscanError::DegenerateGeometry(_) => HumanError {
            message: "The puzzle's corners didn't line up.".into(),
            suggestion: "Try again from less of an angle, keeping the puzzle flat.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Reading --
        SudoscanError::ClassifierUncertain => HumanError {
            message: "A digit couldn't be read.".into(),
            suggestion: "The cell was left empty. Check the board and fill it in by hand if needed.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SudoscanError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SudoscanError::OcrError(_) => HumanError {
            message: "Digit recognition isn't working.".into(),
            suggestion: "Check that the recognition models are installed, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Solving --
        SudoscanError::InvalidBoard(detail) => HumanError {
            message: "That board doesn't look right.".into(),
            suggestion: format!("A board is 81 cells, using 1-9 for digits and 0 or . for blanks. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SudoscanError::Unsatisfiable => HumanError {
            message: "This puzzle has no solution.".into(),
            suggestion: "A digit was probably misread. Check the board against the printed puzzle.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Storage --
        SudoscanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We don't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        SudoscanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that the configuration file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_failures_are_retriable() {
        for err in [
            SudoscanError::NoForegroundFound,
            SudoscanError::InsufficientLines { found: 2, required: 8 },
            SudoscanError::DegenerateGeometry("parallel edges".into()),
        ] {
            let human = humanize_error(&err);
            assert_eq!(human.severity, Severity::Transient);
            assert!(human.retriable);
        }
    }

    #[test]
    fn unsatisfiable_is_permanent() {
        let human = humanize_error(&SudoscanError::Unsatisfiable);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn invalid_board_mentions_detail() {
        let human = humanize_error(&SudoscanError::InvalidBoard("expected 81 cells, got 3".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("got 3"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = SudoscanError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
