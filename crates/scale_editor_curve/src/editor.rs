// SPDX-License-Identifier: MIT OR Apache-2.0
//! The curve editor state machine.

use scale_editor_recording::SessionRecording;
use serde::{Deserialize, Serialize};

/// Pick radius around a point, as Manhattan distance in the normalized
/// scene domain
pub const PICK_RADIUS: f64 = 0.0075;

/// Span of the range-adjustment inputs; values are thousandths of the
/// current scale range
pub const RANGE_SPAN: i32 = 1000;

/// A position in the normalized `[0,1]×[0,1]` curve domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePos {
    /// Normalized recording time
    pub x: f64,
    /// Normalized scale
    pub y: f64,
}

impl CurvePos {
    /// Create a position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    fn manhattan_distance(&self, other: &CurvePos) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// One editable point of the curve.
///
/// Points live in an arena ordered by strictly increasing `x`; the segment
/// `i` of the curve implicitly connects points `i` and `i + 1`, so segment
/// topology never needs separate bookkeeping. `keyframe` is the index of
/// the backing camera keyframe in the recording's store, or `None` for a
/// point inserted at a position no original sample backs (such a point is
/// visual-only and skipped on commit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Normalized recording time
    pub x: f64,
    /// Normalized scale
    pub y: f64,
    /// Index of the backing camera keyframe
    pub keyframe: Option<usize>,
}

impl CurvePoint {
    /// The point's position
    pub fn pos(&self) -> CurvePos {
        CurvePos { x: self.x, y: self.y }
    }
}

/// Pointer button of a press gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Selects the point under the cursor
    Primary,
    /// Deletes the interior point under the cursor
    Secondary,
}

/// Which of the two range-adjustment inputs changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeInput {
    /// Adjusts the lower end of the scale range
    Min,
    /// Adjusts the upper end of the scale range
    Max,
}

/// Interactive editor over the simplified scale curve of one recording.
///
/// The editor owns the recording for the duration of the session; a new
/// call to [`CurveEditor::set_recording`] discards the previous recording
/// together with all derived point state.
#[derive(Debug, Default)]
pub struct CurveEditor {
    recording: Option<SessionRecording>,
    points: Vec<CurvePoint>,
    picked: Option<usize>,
    min_input: i32,
    max_input: i32,
}

impl CurveEditor {
    /// Create an empty editor with no recording loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the edited recording, rebuilding the point arena from its
    /// simplified curve and resetting all gesture state.
    pub fn set_recording(&mut self, recording: SessionRecording) {
        self.points = recording
            .normalized_linearized_scale
            .iter()
            .map(|info| CurvePoint { x: info.x, y: info.y, keyframe: info.keyframe })
            .collect();
        self.picked = None;
        self.min_input = 0;
        self.max_input = 0;
        self.recording = Some(recording);
        self.assert_ordered();
    }

    /// The currently edited recording
    pub fn recording(&self) -> Option<&SessionRecording> {
        self.recording.as_ref()
    }

    /// Take the recording out of the editor, clearing all point state.
    ///
    /// Typically called to hand the recording to the codec for saving at
    /// the end of a session.
    pub fn take_recording(&mut self) -> Option<SessionRecording> {
        self.points.clear();
        self.picked = None;
        self.min_input = 0;
        self.max_input = 0;
        self.recording.take()
    }

    /// The curve points in ascending-`x` order
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// The curve segments as pairs of adjacent points
    pub fn segments(&self) -> impl Iterator<Item = (CurvePoint, CurvePoint)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Index of the picked point, if any
    pub fn picked(&self) -> Option<usize> {
        self.picked
    }

    /// Whether the point at `index` is picked
    pub fn is_picked(&self, index: usize) -> bool {
        self.picked == Some(index)
    }

    /// The pending (min, max) range-adjustment inputs
    pub fn range_inputs(&self) -> (i32, i32) {
        (self.min_input, self.max_input)
    }

    /// Handle a pointer press.
    ///
    /// A primary press near a point picks it (unmarking any previous pick);
    /// a secondary press near an interior point deletes it. Presses on
    /// empty space clear the pick, and a secondary press on an endpoint is
    /// a no-op.
    pub fn on_pointer_down(&mut self, pos: CurvePos, button: PointerButton) {
        self.picked = None;

        let Some(index) = self
            .points
            .iter()
            .position(|p| pos.manhattan_distance(&p.pos()) < PICK_RADIUS)
        else {
            return;
        };

        match button {
            PointerButton::Primary => {
                self.picked = Some(index);
            }
            PointerButton::Secondary => {
                self.delete_point(index);
            }
        }
    }

    /// Handle pointer motion.
    ///
    /// With a picked point this drags it and returns `None`: an interior
    /// point moves to `pos` if its `x` stays strictly between its
    /// neighbors, and stays put entirely otherwise; an endpoint only takes
    /// the new `y`, its `x` is frozen. Without a pick this is a hover: the
    /// position is mapped back into the `(time, scale)` domain of the
    /// recording and returned, with no state change.
    pub fn on_pointer_move(&mut self, pos: CurvePos) -> Option<(f64, f64)> {
        self.assert_ordered();

        if self.picked.is_some() {
            self.drag_picked(pos);
            return None;
        }

        let recording = self.recording.as_ref()?;
        let (min, max) = recording.min_max_scale;
        let time = pos.x * recording.recording_length;
        let scale = min + pos.y * (max - min);
        Some((time, scale))
    }

    /// Handle a pointer release: clears the pick, positions stay put.
    pub fn on_pointer_up(&mut self) {
        self.picked = None;
    }

    /// Handle a double gesture: insert a new point at `pos`.
    ///
    /// The point is spliced between its neighbors in `x` order, splitting
    /// the segment between them. The first original (unsimplified) sample
    /// at or after `pos.x` supplies the backing keyframe, so a re-inserted
    /// point can still commit its scale; if no sample backs the split the
    /// point carries no keyframe reference. Positions outside the interior
    /// of the curve are rejected.
    pub fn on_double_gesture(&mut self, pos: CurvePos) {
        let Some(recording) = &self.recording else {
            return;
        };

        let Some(next) = self.points.iter().position(|p| p.x > pos.x) else {
            tracing::debug!("Rejected insert at x={}: past the last point", pos.x);
            return;
        };
        if next == 0 || pos.x <= self.points[next - 1].x {
            // Insertions must be strictly interior
            tracing::debug!("Rejected insert at x={}: not strictly between neighbors", pos.x);
            return;
        }

        let keyframe = recording
            .original_normalized_scale
            .iter()
            .find(|info| info.x >= pos.x)
            .and_then(|info| info.keyframe);

        self.points.insert(next, CurvePoint { x: pos.x, y: pos.y, keyframe });

        // Insertion already respects the order; the sort is a safeguard
        self.points
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        self.assert_ordered();
    }

    /// Handle a change of one of the range-adjustment inputs.
    ///
    /// Both pending inputs are applied together: with `δ = (max − min) /`
    /// [`RANGE_SPAN`], the candidate range is `(min + lowInput·δ,
    /// max + highInput·δ)`. An inverted or empty candidate range rejects
    /// the adjustment and keeps the inputs pending; otherwise every point's
    /// `y` is remapped into the candidate range and the inputs reset to
    /// neutral. The recording's stored scale range is not modified, so the
    /// remap shifts the scale values a later commit writes.
    pub fn on_range_changed(&mut self, which: RangeInput, value: i32) {
        let value = value.clamp(-RANGE_SPAN, RANGE_SPAN);
        match which {
            RangeInput::Min => self.min_input = value,
            RangeInput::Max => self.max_input = value,
        }
        self.apply_rescale();
    }

    /// Write the edited curve back into the recording.
    ///
    /// Every point with a backing keyframe gets its `y` un-normalized under
    /// the recording's current scale range and written into that keyframe's
    /// scale. Points without a backing keyframe are skipped.
    pub fn commit_to_recording(&mut self) {
        let Some(recording) = &mut self.recording else {
            return;
        };

        let (min, max) = recording.min_max_scale;
        let mut skipped = 0usize;
        for point in &self.points {
            match point.keyframe {
                Some(index) => {
                    let scale = min + point.y * (max - min);
                    if !recording.set_camera_scale(index, scale) {
                        tracing::warn!("Curve point references invalid keyframe {index}");
                    }
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(
                "Commit skipped {skipped} curve point(s) with no backing keyframe; \
                 their edits are visual-only"
            );
        }
    }

    fn drag_picked(&mut self, pos: CurvePos) {
        let Some(index) = self.picked else {
            return;
        };

        let is_endpoint = index == 0 || index + 1 == self.points.len();
        if is_endpoint {
            // Endpoints are fixed in time; only the scale moves
            self.points[index].y = pos.y;
        } else {
            let left = self.points[index - 1].x;
            let right = self.points[index + 1].x;
            if pos.x <= left || pos.x >= right {
                tracing::debug!("Rejected drag to x={}: outside ({left}, {right})", pos.x);
                return;
            }
            self.points[index].x = pos.x;
            self.points[index].y = pos.y;
        }
        self.assert_ordered();
    }

    fn delete_point(&mut self, index: usize) {
        if index == 0 || index + 1 == self.points.len() {
            // The curve's endpoints are never deletable
            tracing::debug!("Rejected delete of endpoint {index}");
            return;
        }

        // The implicit segments collapse into one spanning the neighbors
        self.points.remove(index);
        self.assert_ordered();
    }

    fn apply_rescale(&mut self) {
        let Some(recording) = &self.recording else {
            return;
        };

        let (min, max) = recording.min_max_scale;
        let delta = (max - min) / f64::from(RANGE_SPAN);
        let new_min = min + f64::from(self.min_input) * delta;
        let new_max = max + f64::from(self.max_input) * delta;

        if new_min >= new_max {
            tracing::debug!("Rejected rescale to empty range ({new_min}, {new_max})");
            return;
        }

        for point in &mut self.points {
            let scale = min + point.y * (max - min);
            point.y = (scale - new_min) / (new_max - new_min);
        }

        self.min_input = 0;
        self.max_input = 0;
    }

    fn assert_ordered(&self) {
        debug_assert!(
            self.points.windows(2).all(|w| w[0].x < w[1].x),
            "curve points must be strictly increasing in x"
        );
    }
}
