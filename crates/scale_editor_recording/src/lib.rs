// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session recording store and codec for the scale editor.
//!
//! This crate provides everything that exists before (and after) the
//! interactive editing session:
//! - The keyframe store: camera and script keyframes in playback order
//! - The text codec for the `OpenSpace_record/playback01.00A` format
//! - Scale-curve normalization and linear simplification
//!
//! ## Architecture
//!
//! Loading a recording parses the keyframe list, derives the normalized
//! scale curve, and simplifies it. The curve editor (a separate crate)
//! mutates the simplified curve and commits accepted edits back into the
//! camera keyframes here, after which the recording can be serialized
//! again.

pub mod format;
pub mod keyframe;
pub mod normalize;

pub use format::{
    load_session_recording, parse_session_recording, save_session_recording,
    serialize_session_recording, LoadError, SaveError, FORMAT_HEADER,
};
pub use keyframe::{
    CameraKeyframe, Keyframe, KeyframePayload, ScaleInfo, ScriptKeyframe, SessionRecording,
};
pub use normalize::{normalize_scale_curve, simplify_linear, SIMPLIFY_EPSILON};
