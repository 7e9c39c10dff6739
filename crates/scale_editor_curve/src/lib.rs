// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive scale-curve editing for session recordings.
//!
//! This crate provides the editor-side model of the scale-over-time curve:
//! - Ordered point arena with implicit segments between neighbors
//! - Pointer gestures: pick, drag, release, insert, delete
//! - Range rescaling of the whole curve
//! - Committing edited scales back into the recording's camera keyframes
//!
//! ## Architecture
//!
//! All positions are expressed in the normalized `[0,1]×[0,1]` domain; the
//! mapping to and from screen pixels is the embedding view's concern. Every
//! gesture runs synchronously to completion, and gestures that would break
//! a structural invariant are silently rejected rather than surfaced as
//! errors.

pub mod editor;

pub use editor::{
    CurveEditor, CurvePoint, CurvePos, PointerButton, RangeInput, PICK_RADIUS, RANGE_SPAN,
};
