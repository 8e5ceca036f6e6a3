//! Per-frame pipeline output.

use gaze_core::{GazeSample, GazeState, Pt2};

/// One output unit per processed frame, handed to exactly one consumer
/// through the bounded channel and then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Smoothed gaze, confidence and the committed (debounced) state.
    pub sample: GazeSample,
    /// Pre-debounce classification of this frame.
    pub raw_state: GazeState,
    /// Whether a face cleared the confidence gate this frame.
    pub face_detected: bool,
    /// Set while the face has been lost longer than the auto-pause window.
    pub auto_paused: bool,
    /// Iris centers in camera-frame coordinates, for debug overlays.
    pub left_iris: Option<Pt2>,
    pub right_iris: Option<Pt2>,
}
