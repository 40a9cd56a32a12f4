// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fusion of near-duplicate Hough lines.

use sudoscan_core::config::MergeTolerances;
use sudoscan_core::types::Line;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy)]
enum Slot {
    Live(Line),
    Disabled,
}

/// Merge near-duplicate lines until no pair is close enough to fuse.
///
/// Each round is one [`merge_pass`]. Rounds repeat until a pass fuses
/// nothing, so feeding the result back in returns it unchanged.
#[instrument(skip_all, fields(input = lines.len()))]
pub fn merge_close_lines(
    lines: &[Line],
    width: u32,
    height: u32,
    tolerances: &MergeTolerances,
) -> Vec<Line> {
    let mut current = lines.to_vec();
    let mut rounds = 0;
    loop {
        let (merged, fused) = merge_pass(&current, width, height, tolerances);
        rounds += 1;
        current = merged;
        if fused == 0 {
            break;
        }
    }
    debug!(output = current.len(), rounds, "Lines merged");
    current
}

/// One pairwise pass over `lines` in order.
///
/// For every pair `i < j` that are both still live, line `i` absorbs line `j`
/// (becoming the mean of the two) when [`are_close`] holds; `j` is disabled.
/// A line that absorbed a neighbour keeps being compared with later lines in
/// its updated form. Returns the survivors in their original order and the
/// number of fusions.
pub fn merge_pass(
    lines: &[Line],
    width: u32,
    height: u32,
    tolerances: &MergeTolerances,
) -> (Vec<Line>, usize) {
    let mut slots: Vec<Slot> = lines.iter().copied().map(Slot::Live).collect();
    let mut fused = 0;

    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            let (Slot::Live(a), Slot::Live(b)) = (slots[i], slots[j]) else {
                continue;
            };
            if are_close(&a, &b, width, height, tolerances) {
                slots[i] = Slot::Live(a.mean(&b));
                slots[j] = Slot::Disabled;
                fused += 1;
            }
        }
    }

    let survivors = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Live(line) => Some(line),
            Slot::Disabled => None,
        })
        .collect();
    (survivors, fused)
}

/// Whether two lines describe the same physical edge.
///
/// Offsets and angles must both be within tolerance, and both endpoint pairs
/// (computed on the same frame borders, chosen by `a`'s orientation) must be
/// closer than the squared-distance tolerance.
pub fn are_close(a: &Line, b: &Line, width: u32, height: u32, tolerances: &MergeTolerances) -> bool {
    if (a.offset() - b.offset()).abs() >= tolerances.max_offset_delta {
        return false;
    }
    if (a.angle() - b.angle()).abs() >= tolerances.max_angle_delta_deg.to_radians() {
        return false;
    }

    let orientation = a.orientation();
    let (a1, a2) = a.endpoints_along(orientation, width, height);
    let (b1, b2) = b.endpoints_along(orientation, width, height);
    a1.distance_sq(&b1) < tolerances.max_endpoint_distance_sq
        && a2.distance_sq(&b2) < tolerances.max_endpoint_distance_sq
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 400;
    const H: u32 = 400;

    fn tol() -> MergeTolerances {
        MergeTolerances::default()
    }

    #[test]
    fn close_lines_merge_to_their_mean() {
        let lines = [Line::from_degrees(100.0, 90.0), Line::from_degrees(104.0, 92.0)];
        let merged = merge_close_lines(&lines, W, H, &tol());
        assert_eq!(merged.len(), 1);
        assert!((merged[0].offset() - 102.0).abs() < 1e-9);
        assert!((merged[0].angle_degrees() - 91.0).abs() < 1e-9);
    }

    #[test]
    fn distant_lines_are_kept() {
        let lines = [
            Line::from_degrees(100.0, 90.0),
            Line::from_degrees(160.0, 90.0),
            Line::from_degrees(100.0, 0.0),
        ];
        let merged = merge_close_lines(&lines, W, H, &tol());
        assert_eq!(merged, lines.to_vec());
    }

    #[test]
    fn lines_beyond_angle_tolerance_stay_separate() {
        let lines = [Line::from_degrees(100.0, 79.0), Line::from_degrees(100.0, 90.0)];
        let (merged, fused) = merge_pass(&lines, W, H, &tol());
        assert_eq!(fused, 0);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn endpoint_check_rejects_crossing_lines() {
        // Same offset, 9 degrees apart: the far endpoints diverge by ~66 px.
        let a = Line::from_degrees(200.0, 90.0);
        let b = Line::from_degrees(200.0, 99.0);
        assert!(!are_close(&a, &b, W, H, &tol()));
        let loose = MergeTolerances {
            max_endpoint_distance_sq: 1e6,
            ..tol()
        };
        assert!(are_close(&a, &b, W, H, &loose));
    }

    #[test]
    fn survivors_keep_input_order() {
        let lines = [
            Line::from_degrees(50.0, 0.0),
            Line::from_degrees(300.0, 90.0),
            Line::from_degrees(52.0, 0.0),
            Line::from_degrees(10.0, 90.0),
        ];
        let (merged, fused) = merge_pass(&lines, W, H, &tol());
        assert_eq!(fused, 1);
        assert_eq!(merged.len(), 3);
        assert!((merged[0].offset() - 51.0).abs() < 1e-9);
        assert_eq!(merged[1], lines[1]);
        assert_eq!(merged[2], lines[3]);
    }

    #[test]
    fn merging_is_idempotent() {
        let lines: Vec<Line> = [0.0, 12.0, 24.0, 36.0, 48.0, 150.0, 165.0]
            .iter()
            .map(|&offset| Line::from_degrees(offset + 20.0, 90.0))
            .chain([Line::from_degrees(80.0, 1.0), Line::from_degrees(90.0, 2.0)])
            .collect();
        let once = merge_close_lines(&lines, W, H, &tol());
        let twice = merge_close_lines(&once, W, H, &tol());
        assert_eq!(once, twice);
        let (_, fused) = merge_pass(&once, W, H, &tol());
        assert_eq!(fused, 0);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(merge_close_lines(&[], W, H, &tol()).is_empty());
    }
}
