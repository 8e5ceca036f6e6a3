//! Domain data types shared across the workspace.

use serde::{Deserialize, Serialize};

use crate::math::{Pt2, Real};

/// Classification of where the subject is looking, relative to the
/// operator-defined area of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GazeState {
    /// Confidence too low, or no face observed this frame.
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Smoothed gaze point falls inside the area of interest.
    #[serde(rename = "IN_AREA")]
    InArea,
    /// Smoothed gaze point falls outside the area of interest.
    #[serde(rename = "OUT_OF_AREA")]
    OutOfArea,
}

impl GazeState {
    /// Stable string form used in serialized records and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::InArea => "IN_AREA",
            Self::OutOfArea => "OUT_OF_AREA",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UNKNOWN" => Some(Self::Unknown),
            "IN_AREA" => Some(Self::InArea),
            "OUT_OF_AREA" => Some(Self::OutOfArea),
            _ => None,
        }
    }
}

/// Normalized screen coordinate in `[0,1] x [0,1]`, relative to the same
/// reference frame the calibration targets were shown in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    pub x: Real,
    pub y: Real,
}

impl GazePoint {
    pub fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    /// Screen center; the pinned value on frames without a usable face.
    pub fn center() -> Self {
        Self { x: 0.5, y: 0.5 }
    }

    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// Landmarks of one eye in normalized camera-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    /// Iris center (mean of the iris ring landmarks).
    pub iris: Pt2,
    /// Outer eye corner.
    pub outer_corner: Pt2,
    /// Inner eye corner.
    pub inner_corner: Pt2,
    /// Upper lid midpoint.
    pub top_lid: Pt2,
    /// Lower lid midpoint.
    pub bottom_lid: Pt2,
}

impl EyeLandmarks {
    /// Vertical lid gap over horizontal corner span. Roughly 0.15 for a
    /// fully open eye, near zero when closed.
    pub fn openness(&self) -> Real {
        let vert = (self.top_lid.y - self.bottom_lid.y).abs();
        let horiz = (self.outer_corner.x - self.inner_corner.x).abs() + 1e-6;
        vert / horiz
    }
}

/// One frame's worth of facial landmarks, as produced by the external
/// landmark detector. Immutable; consumed only by feature extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub left_eye: EyeLandmarks,
    pub right_eye: EyeLandmarks,
    pub nose: Pt2,
    pub chin: Pt2,
    pub forehead: Pt2,
    /// Detection confidence in `[0,1]`, derived from eye openness.
    pub confidence: Real,
}

/// An eye-openness ratio of 0.15 maps to full confidence; lower ratios
/// scale down linearly (squinting and blinks read as low confidence).
const FULL_OPENNESS: Real = 0.15;

impl FaceObservation {
    /// Build an observation, deriving confidence from mean eye openness.
    pub fn from_landmarks(
        left_eye: EyeLandmarks,
        right_eye: EyeLandmarks,
        nose: Pt2,
        chin: Pt2,
        forehead: Pt2,
    ) -> Self {
        let mean_open = (left_eye.openness() + right_eye.openness()) / 2.0;
        let confidence = (mean_open / FULL_OPENNESS).clamp(0.0, 1.0);
        Self {
            left_eye,
            right_eye,
            nose,
            chin,
            forehead,
            confidence,
        }
    }
}

/// One processed frame: smoothed gaze, confidence, and the committed state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Monotonic seconds (session-relative). Used for all durations.
    pub t_mono_s: Real,
    /// Wall-clock Unix seconds. Display and audit only.
    pub t_wall_s: Real,
    pub gaze: GazePoint,
    pub confidence: Real,
    /// Debounced state at this frame.
    pub state: GazeState,
}

/// A committed state transition with the timing of the segment it closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    pub from_state: GazeState,
    pub to_state: GazeState,
    /// Monotonic seconds when the closed segment began.
    pub start_mono_s: Real,
    /// Monotonic seconds when the transition committed.
    pub end_mono_s: Real,
}

impl StateEvent {
    /// Duration of the closed `from_state` segment, in milliseconds.
    pub fn duration_ms(&self) -> Real {
        (self.end_mono_s - self.start_mono_s) * 1000.0
    }
}

/// Operator-placed annotation within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub t_mono_s: Real,
    pub t_wall_s: Real,
    pub label: String,
}
