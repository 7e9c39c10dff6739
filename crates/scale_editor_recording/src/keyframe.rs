// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions and the in-memory recording store.

use serde::{Deserialize, Serialize};

/// One recorded event at a given playback time.
///
/// `recording_time` is the ordering key; the store keeps keyframes in file
/// order, which is expected to be non-decreasing in `recording_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds since application startup when the event was recorded
    pub startup_time: f64,
    /// Seconds since the start of the recording (ordering key)
    pub recording_time: f64,
    /// In-game simulation time in seconds
    pub ingame_time: f64,
    /// Variant payload
    pub payload: KeyframePayload,
}

/// Variant payload of a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyframePayload {
    /// Camera pose sample
    Camera(CameraKeyframe),
    /// Script invocation
    Script(ScriptKeyframe),
}

/// Camera pose payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraKeyframe {
    /// Camera position
    pub position: [f64; 3],
    /// Orientation quaternion as (w, x, y, z); not validated for unit length
    pub orientation: [f64; 4],
    /// Camera scale, the quantity the editor hand-tunes
    pub scale: f64,
    /// Whether the camera follows a scene-graph node
    pub should_follow: bool,
    /// Name of the followed node, may be empty
    pub follow_node: String,
}

/// Script invocation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptKeyframe {
    /// The script text, whitespace-collapsed to single spaces
    pub script: String,
}

impl Keyframe {
    /// Get the camera payload if this is a camera keyframe
    pub fn as_camera(&self) -> Option<&CameraKeyframe> {
        match &self.payload {
            KeyframePayload::Camera(camera) => Some(camera),
            KeyframePayload::Script(_) => None,
        }
    }

    /// Get the camera payload mutably if this is a camera keyframe
    pub fn as_camera_mut(&mut self) -> Option<&mut CameraKeyframe> {
        match &mut self.payload {
            KeyframePayload::Camera(camera) => Some(camera),
            KeyframePayload::Script(_) => None,
        }
    }
}

/// One sample of the normalized scale curve.
///
/// `x` is `recording_time / recording_length`, `y` is
/// `(scale - min) / (max - min)`, both in `[0, 1]`. `keyframe` is the index
/// of the originating camera keyframe in the store, or `None` for a sample
/// synthesized during curve editing that is not (yet) bound to a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleInfo {
    /// Normalized recording time
    pub x: f64,
    /// Normalized scale
    pub y: f64,
    /// Index of the backing camera keyframe in the store
    pub keyframe: Option<usize>,
}

/// An ordered session recording plus its derived scale-curve data.
///
/// The derived fields are recomputed on load and are only valid for the
/// keyframe list they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    /// Keyframes in file order (= time order)
    pub keyframes: Vec<Keyframe>,
    /// `recording_time` of the last keyframe
    pub recording_length: f64,
    /// (min, max) of `scale` over all camera keyframes
    pub min_max_scale: (f64, f64),
    /// Normalized curve before simplification; ground truth for point
    /// insertion, never mutated after load
    pub original_normalized_scale: Vec<ScaleInfo>,
    /// Simplified curve, mutated by editing operations
    pub normalized_linearized_scale: Vec<ScaleInfo>,
}

impl SessionRecording {
    /// Number of camera keyframes in the store
    pub fn camera_count(&self) -> usize {
        self.keyframes.iter().filter(|k| k.as_camera().is_some()).count()
    }

    /// Iterate over camera keyframes with their store indices
    pub fn cameras(&self) -> impl Iterator<Item = (usize, &Keyframe, &CameraKeyframe)> {
        self.keyframes
            .iter()
            .enumerate()
            .filter_map(|(idx, k)| k.as_camera().map(|camera| (idx, k, camera)))
    }

    /// Write a scale value into the camera keyframe at `index`.
    ///
    /// Returns `false` if the index is out of range or does not refer to a
    /// camera keyframe.
    pub fn set_camera_scale(&mut self, index: usize, scale: f64) -> bool {
        match self.keyframes.get_mut(index).and_then(Keyframe::as_camera_mut) {
            Some(camera) => {
                camera.scale = scale;
                true
            }
            None => false,
        }
    }
}
