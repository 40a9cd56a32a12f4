// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection of the four outer boundary lines of the puzzle.

use sudoscan_core::config::EdgeConfig;
use sudoscan_core::error::{Result, SudoscanError};
use sudoscan_core::types::{EdgeQuadruple, Line};
use tracing::{debug, instrument, warn};

/// Each side needs at least this many lines in its family (the two extremes).
const MIN_FAMILY_SIZE: usize = 2;

/// Pick `top`, `bottom`, `left` and `right` from the merged line set.
///
/// Lines whose normal is within `family_tolerance_deg` of 90° run
/// horizontally: the smallest offset is the top edge, the largest the
/// bottom. Lines whose normal is within the tolerance of 0° or 180° run
/// vertically: the smallest x-intercept is the left edge, the largest the
/// right. All other lines are ignored.
///
/// Fails with [`SudoscanError::InsufficientLines`] when fewer than
/// `min_lines` lines were found or either family has fewer than two members.
#[instrument(skip_all, fields(lines = lines.len()))]
pub fn classify_edges(lines: &[Line], config: &EdgeConfig) -> Result<EdgeQuadruple> {
    if lines.len() < config.min_lines {
        warn!(
            found = lines.len(),
            required = config.min_lines,
            "Too few lines for grid edges"
        );
        return Err(SudoscanError::InsufficientLines {
            found: lines.len(),
            required: config.min_lines,
        });
    }

    let tolerance = config.family_tolerance_deg;
    let horizontal: Vec<&Line> = lines
        .iter()
        .filter(|line| (line.angle_degrees() - 90.0).abs() < tolerance)
        .collect();
    let vertical: Vec<&Line> = lines
        .iter()
        .filter(|line| {
            let deg = line.angle_degrees();
            deg < tolerance || deg > 180.0 - tolerance
        })
        .collect();
    debug!(
        horizontal = horizontal.len(),
        vertical = vertical.len(),
        "Lines classified"
    );

    for family in [&horizontal, &vertical] {
        if family.len() < MIN_FAMILY_SIZE {
            warn!(found = family.len(), "Line family too small for two edges");
            return Err(SudoscanError::InsufficientLines {
                found: family.len(),
                required: MIN_FAMILY_SIZE,
            });
        }
    }

    let (top, bottom) = extremes(&horizontal, Line::offset);
    let (left, right) = extremes(&vertical, Line::x_intercept);
    Ok(EdgeQuadruple {
        top,
        bottom,
        left,
        right,
    })
}

/// The lines with the smallest and largest `key`. Earlier lines win ties.
/// `family` must be non-empty.
fn extremes(family: &[&Line], key: impl Fn(&Line) -> f64) -> (Line, Line) {
    let first = *family[0];
    family.iter().skip(1).fold((first, first), |(min, max), &&line| {
        let k = key(&line);
        (
            if k < key(&min) { line } else { min },
            if k > key(&max) { line } else { max },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EdgeConfig {
        EdgeConfig::default()
    }

    #[test]
    fn too_few_lines_is_an_error() {
        let lines: Vec<Line> = (0..7)
            .map(|i| Line::from_degrees(20.0 * i as f64, if i % 2 == 0 { 0.0 } else { 90.0 }))
            .collect();
        let err = classify_edges(&lines, &config()).unwrap_err();
        assert!(matches!(
            err,
            SudoscanError::InsufficientLines { found: 7, required: 8 }
        ));
    }

    #[test]
    fn picks_extreme_lines_per_family() {
        let lines = vec![
            Line::from_degrees(150.0, 90.0),
            Line::from_degrees(50.0, 91.0),
            Line::from_degrees(350.0, 89.0),
            Line::from_degrees(100.0, 90.0),
            Line::from_degrees(40.0, 0.0),
            Line::from_degrees(200.0, 2.0),
            // x = ~320 seen with the normal pointing the other way.
            Line::from_degrees(-320.0, 178.0),
            // Diagonals are ignored.
            Line::from_degrees(10.0, 45.0),
            Line::from_degrees(500.0, 135.0),
        ];
        let edges = classify_edges(&lines, &config()).unwrap();
        assert_eq!(edges.top, lines[1]);
        assert_eq!(edges.bottom, lines[2]);
        assert_eq!(edges.left, lines[4]);
        assert_eq!(edges.right, lines[6]);
    }

    #[test]
    fn a_missing_family_is_an_error_not_a_default() {
        let mut lines: Vec<Line> = (0..8)
            .map(|i| Line::from_degrees(30.0 * i as f64, 90.0))
            .collect();
        lines.push(Line::from_degrees(60.0, 0.0));
        let err = classify_edges(&lines, &config()).unwrap_err();
        assert!(matches!(
            err,
            SudoscanError::InsufficientLines { found: 1, required: 2 }
        ));
    }

    #[test]
    fn min_lines_is_configurable() {
        let lines = vec![
            Line::from_degrees(10.0, 90.0),
            Line::from_degrees(90.0, 90.0),
            Line::from_degrees(15.0, 0.0),
            Line::from_degrees(95.0, 0.0),
        ];
        assert!(classify_edges(&lines, &config()).is_err());
        let relaxed = EdgeConfig {
            min_lines: 4,
            ..config()
        };
        let edges = classify_edges(&lines, &relaxed).unwrap();
        assert_eq!(edges.top.offset(), 10.0);
        assert_eq!(edges.right.offset(), 95.0);
    }
}
