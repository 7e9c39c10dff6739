// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scale-curve normalization and linear simplification.

use crate::keyframe::{Keyframe, ScaleInfo};

/// Maximum deviation from the interpolated value for a point to count as
/// linearly redundant
pub const SIMPLIFY_EPSILON: f64 = 1e-4;

/// Derive the normalized scale curve from the camera keyframes.
///
/// Every camera keyframe becomes one sample with
/// `x = recording_time / recording_length` and
/// `y = (scale - min) / (max - min)`, carrying the index of its keyframe.
/// Script keyframes contribute no samples. Camera keyframes sharing a
/// `recording_time` collapse to a single sample (the last one wins), so the
/// curve is strictly increasing in `x`.
///
/// The caller must have rejected degenerate inputs first
/// (`recording_length == 0` or `min >= max`), otherwise the divisions here
/// produce non-finite values.
pub fn normalize_scale_curve(
    keyframes: &[Keyframe],
    recording_length: f64,
    min_max_scale: (f64, f64),
) -> Vec<ScaleInfo> {
    let (min, max) = min_max_scale;

    let mut samples: Vec<ScaleInfo> = keyframes
        .iter()
        .enumerate()
        .filter_map(|(idx, k)| k.as_camera().map(|camera| (idx, k, camera)))
        .map(|(idx, k, camera)| ScaleInfo {
            x: k.recording_time / recording_length,
            y: (camera.scale - min) / (max - min),
            keyframe: Some(idx),
        })
        .collect();

    // Tied recording times would produce duplicate-x points that break the
    // curve's strict ordering; keep the last sample of each tie
    samples.dedup_by(|later, earlier| {
        if later.x == earlier.x {
            *earlier = *later;
            true
        } else {
            false
        }
    });

    samples
}

/// Remove curve points that are represented by linear interpolation of
/// their neighbors.
///
/// Single forward sweep over the interior points. A point is removed when
/// the linear interpolation between its (current, already-simplified)
/// neighbors lands within [`SIMPLIFY_EPSILON`] of its `y`, or when the two
/// neighbors have exactly equal `y` (a flat segment swallows any enclosed
/// point regardless of deviation). After a removal the same index is
/// examined again, so the newly adjacent pair becomes the next comparison
/// window. The first and last points are never candidates.
pub fn simplify_linear(points: &mut Vec<ScaleInfo>) {
    let mut i = 1;
    while i + 1 < points.len() {
        let before = points[i - 1];
        let current = points[i];
        let after = points[i + 1];

        let t = (current.x - before.x) / (after.x - before.x);
        let v = before.y + t * (after.y - before.y);

        if (v - current.y).abs() <= SIMPLIFY_EPSILON || after.y == before.y {
            points.remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{CameraKeyframe, KeyframePayload, ScriptKeyframe};

    fn camera(recording_time: f64, scale: f64) -> Keyframe {
        Keyframe {
            startup_time: recording_time,
            recording_time,
            ingame_time: 0.0,
            payload: KeyframePayload::Camera(CameraKeyframe {
                position: [0.0; 3],
                orientation: [1.0, 0.0, 0.0, 0.0],
                scale,
                should_follow: false,
                follow_node: String::new(),
            }),
        }
    }

    fn point(x: f64, y: f64) -> ScaleInfo {
        ScaleInfo { x, y, keyframe: None }
    }

    #[test]
    fn test_normalize_maps_to_unit_square() {
        let keyframes = vec![
            camera(0.0, 1.0),
            Keyframe {
                startup_time: 2.0,
                recording_time: 2.0,
                ingame_time: 0.0,
                payload: KeyframePayload::Script(ScriptKeyframe {
                    script: "noop".to_string(),
                }),
            },
            camera(5.0, 9.0),
            camera(10.0, 5.0),
        ];

        let curve = normalize_scale_curve(&keyframes, 10.0, (1.0, 9.0));

        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0], ScaleInfo { x: 0.0, y: 0.0, keyframe: Some(0) });
        assert_eq!(curve[1], ScaleInfo { x: 0.5, y: 1.0, keyframe: Some(2) });
        assert_eq!(curve[2], ScaleInfo { x: 1.0, y: 0.5, keyframe: Some(3) });
    }

    #[test]
    fn test_normalize_collapses_tied_times() {
        // Two cameras share recording_time 5; the later one wins and the
        // curve stays strictly increasing in x
        let keyframes = vec![
            camera(0.0, 1.0),
            camera(5.0, 9.0),
            camera(5.0, 2.0),
            camera(10.0, 5.0),
        ];

        let curve = normalize_scale_curve(&keyframes, 10.0, (1.0, 9.0));

        assert_eq!(curve.len(), 3);
        assert!(curve.windows(2).all(|w| w[0].x < w[1].x));
        assert_eq!(curve[1], ScaleInfo { x: 0.5, y: 0.125, keyframe: Some(2) });
    }

    #[test]
    fn test_simplify_removes_midpoint_on_line() {
        // y at x=0.5 is exactly the interpolation of its neighbors
        let mut points = vec![point(0.0, 0.0), point(0.5, 0.5), point(1.0, 1.0)];
        simplify_linear(&mut points);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].x, 0.0);
        assert_eq!(points[1].x, 1.0);
    }

    #[test]
    fn test_simplify_keeps_corner() {
        let mut points = vec![point(0.0, 0.0), point(0.5, 0.9), point(1.0, 0.1)];
        simplify_linear(&mut points);

        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_simplify_flat_segment_swallows_any_point() {
        // Neighbors have equal y, so the enclosed point goes even though it
        // is far outside the epsilon band
        let mut points = vec![point(0.0, 0.3), point(0.5, 0.9), point(1.0, 0.3)];
        simplify_linear(&mut points);

        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_simplify_reexamines_after_removal() {
        // Removing the point at x=0.25 makes the one at x=0.5 redundant
        // against the widened window as well
        let mut points = vec![
            point(0.0, 0.0),
            point(0.25, 0.25),
            point(0.5, 0.5),
            point(0.75, 0.75),
            point(1.0, 1.0),
        ];
        simplify_linear(&mut points);

        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_simplify_idempotent() {
        let mut points = vec![
            point(0.0, 0.0),
            point(0.25, 0.5),
            point(0.5, 1.0),
            point(0.75, 0.3),
            point(1.0, 0.9),
        ];
        simplify_linear(&mut points);
        let first_pass = points.clone();
        assert_eq!(first_pass.len(), 4);

        simplify_linear(&mut points);
        assert_eq!(points, first_pass);
    }

    #[test]
    fn test_simplify_leaves_two_point_curve_alone() {
        let mut points = vec![point(0.0, 0.0), point(1.0, 1.0)];
        simplify_linear(&mut points);
        assert_eq!(points.len(), 2);
    }
}
