// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text codec for the session recording format.
//!
//! The format is newline-delimited:
//!
//! ```text
//! OpenSpace_record/playback01.00A
//! camera <startup> <recTime> <gameTime> <px> <py> <pz> <qw> <qx> <qy> <qz> <scale> <F|-> <followNode>
//! script <startup> <recTime> <gameTime> 1 <scriptText...>
//! ```
//!
//! Fields are single-space separated. Repeated spaces are tolerated on read
//! (collapsed) but not reproduced on write.

use crate::keyframe::{
    CameraKeyframe, Keyframe, KeyframePayload, ScriptKeyframe, SessionRecording,
};
use crate::normalize::{normalize_scale_curve, simplify_linear};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Required first line of every recording file
pub const FORMAT_HEADER: &str = "OpenSpace_record/playback01.00A";

/// Errors that abort loading a recording.
///
/// No partial recording is ever returned; line numbers are 1-based and
/// count from the first line after the header.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The first line is not the expected format header
    #[error("header is not '{FORMAT_HEADER}'")]
    HeaderMismatch,

    /// A line starts with a record type other than `camera` or `script`
    #[error("unknown keyframe type '{kind}' in line {line}")]
    UnknownKeyframeType {
        /// The unrecognized type token
        kind: String,
        /// 1-based line number after the header
        line: usize,
    },

    /// A script line declares a script count other than 1
    #[error("can only understand script keyframes with 1 script, got '{count}' in line {line}")]
    UnsupportedScriptCount {
        /// The offending count token
        count: String,
        /// 1-based line number after the header
        line: usize,
    },

    /// A line has too few fields for its record type
    #[error("malformed {kind} keyframe in line {line}: missing fields")]
    MalformedLine {
        /// The record type of the line
        kind: &'static str,
        /// 1-based line number after the header
        line: usize,
    },

    /// The recording has no keyframes or a zero recording length
    #[error("recording length is zero, nothing to normalize against")]
    ZeroLengthRecording,

    /// No camera keyframes, or all camera keyframes share the same scale
    #[error("camera scales span an empty range, scale normalization is impossible")]
    DegenerateScaleRange,

    /// The simplified curve has fewer than two points and cannot be edited
    #[error("after normalization, less than two scale values are left")]
    TooFewScalePoints,

    /// The file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors that abort saving a recording
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The file could not be written or the atomic rename failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse a numeric token the way `atof` does: the longest leading prefix
/// that parses as a float wins, and a token with no parseable prefix is 0.
fn parse_lenient(token: &str) -> f64 {
    for end in (1..=token.len()).rev() {
        if !token.is_char_boundary(end) {
            continue;
        }
        if let Ok(value) = token[..end].parse::<f64>() {
            return value;
        }
    }
    0.0
}

/// Parse the textual recording format into a [`SessionRecording`].
///
/// All derived curve data (recording length, scale range, normalized and
/// simplified curves) is computed before returning, so a successful result
/// is immediately editable.
pub fn parse_session_recording(text: &str) -> Result<SessionRecording, LoadError> {
    let mut lines = text.lines();

    let header = lines.next().unwrap_or_default().trim_end_matches('\r');
    if header != FORMAT_HEADER {
        return Err(LoadError::HeaderMismatch);
    }

    let mut keyframes = Vec::new();
    let mut min_max_scale = (f64::MAX, -f64::MAX);

    for (line_idx, raw_line) in lines.enumerate() {
        let line_number = line_idx + 1;
        let line = raw_line.trim_end_matches('\r');

        // Repeated separators produce empty tokens; drop them
        let parts: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
        let Some(&kind) = parts.first() else {
            continue;
        };

        match kind {
            "script" => {
                if parts.len() < 5 {
                    return Err(LoadError::MalformedLine { kind: "script", line: line_number });
                }
                if parts[4] != "1" {
                    return Err(LoadError::UnsupportedScriptCount {
                        count: parts[4].to_string(),
                        line: line_number,
                    });
                }

                keyframes.push(Keyframe {
                    startup_time: parse_lenient(parts[1]),
                    recording_time: parse_lenient(parts[2]),
                    ingame_time: parse_lenient(parts[3]),
                    payload: KeyframePayload::Script(ScriptKeyframe {
                        // Lossy if the original script had repeated spaces;
                        // no tokens at all is a valid empty script
                        script: parts[5..].join(" "),
                    }),
                });
            }
            "camera" => {
                if parts.len() < 14 {
                    return Err(LoadError::MalformedLine { kind: "camera", line: line_number });
                }

                let scale = parse_lenient(parts[11]);
                keyframes.push(Keyframe {
                    startup_time: parse_lenient(parts[1]),
                    recording_time: parse_lenient(parts[2]),
                    ingame_time: parse_lenient(parts[3]),
                    payload: KeyframePayload::Camera(CameraKeyframe {
                        position: [
                            parse_lenient(parts[4]),
                            parse_lenient(parts[5]),
                            parse_lenient(parts[6]),
                        ],
                        orientation: [
                            parse_lenient(parts[7]),
                            parse_lenient(parts[8]),
                            parse_lenient(parts[9]),
                            parse_lenient(parts[10]),
                        ],
                        scale,
                        should_follow: parts[12] == "F",
                        follow_node: parts[13].to_string(),
                    }),
                });

                if scale < min_max_scale.0 {
                    min_max_scale.0 = scale;
                }
                if scale > min_max_scale.1 {
                    min_max_scale.1 = scale;
                }
            }
            _ => {
                return Err(LoadError::UnknownKeyframeType {
                    kind: kind.to_string(),
                    line: line_number,
                });
            }
        }
    }

    let recording_length = match keyframes.last() {
        Some(last) => last.recording_time,
        None => return Err(LoadError::ZeroLengthRecording),
    };
    if recording_length == 0.0 {
        return Err(LoadError::ZeroLengthRecording);
    }
    if min_max_scale.0 >= min_max_scale.1 {
        // Covers both zero camera keyframes and an all-equal scale column
        return Err(LoadError::DegenerateScaleRange);
    }

    let original_normalized_scale =
        normalize_scale_curve(&keyframes, recording_length, min_max_scale);

    let mut normalized_linearized_scale = original_normalized_scale.clone();
    simplify_linear(&mut normalized_linearized_scale);

    if normalized_linearized_scale.len() < 2 {
        return Err(LoadError::TooFewScalePoints);
    }

    Ok(SessionRecording {
        keyframes,
        recording_length,
        min_max_scale,
        original_normalized_scale,
        normalized_linearized_scale,
    })
}

/// Load a recording from a file.
pub fn load_session_recording(path: impl AsRef<Path>) -> Result<SessionRecording, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let recording = parse_session_recording(&text)?;

    tracing::info!(
        "Loaded session recording {:?}: {} keyframes, {} curve points, length {}s",
        path,
        recording.keyframes.len(),
        recording.normalized_linearized_scale.len(),
        recording.recording_length
    );
    Ok(recording)
}

/// Serialize a recording back into its textual format.
///
/// Keyframes are written in store order with single-space separators. The
/// follow flag is written as `F` when true and `-` when false, matching the
/// format's write convention (reads accept `F` and treat anything else as
/// false).
pub fn serialize_session_recording(recording: &SessionRecording) -> String {
    let mut out = String::new();
    out.push_str(FORMAT_HEADER);
    out.push('\n');

    for keyframe in &recording.keyframes {
        match &keyframe.payload {
            KeyframePayload::Camera(camera) => {
                let _ = writeln!(
                    out,
                    "camera {} {} {} {} {} {} {} {} {} {} {} {} {}",
                    keyframe.startup_time,
                    keyframe.recording_time,
                    keyframe.ingame_time,
                    camera.position[0],
                    camera.position[1],
                    camera.position[2],
                    camera.orientation[0],
                    camera.orientation[1],
                    camera.orientation[2],
                    camera.orientation[3],
                    camera.scale,
                    if camera.should_follow { "F" } else { "-" },
                    camera.follow_node
                );
            }
            KeyframePayload::Script(script) => {
                let _ = writeln!(
                    out,
                    "script {} {} {} 1 {}",
                    keyframe.startup_time,
                    keyframe.recording_time,
                    keyframe.ingame_time,
                    script.script
                );
            }
        }
    }

    out
}

/// Save a recording to a file.
///
/// The write is atomic: the content goes to a sibling temporary file which
/// is then renamed over the destination, so a failed save never leaves a
/// truncated recording behind.
pub fn save_session_recording(
    recording: &SessionRecording,
    path: impl AsRef<Path>,
) -> Result<(), SaveError> {
    let path = path.as_ref();
    let text = serialize_session_recording(recording);

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &text)?;
    fs::rename(&tmp, path)?;

    tracing::info!(
        "Saved session recording {:?}: {} keyframes",
        path,
        recording.keyframes.len()
    );
    Ok(())
}
