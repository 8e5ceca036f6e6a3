//! Replay of recorded observation streams.
//!
//! A recorded stream stands in for the live camera + landmark detector
//! pair: the "frame" is the already-extracted optional observation. The
//! CLI replays session recordings through the full pipeline this way, and
//! the integration tests script their scenarios with it.

use serde::{Deserialize, Serialize};

use gaze_core::{FaceObservation, Real};

use crate::source::{FrameSource, FrameStamp, LandmarkDetector};

/// One recorded frame: timestamps plus at most one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub t_mono_s: Real,
    pub t_wall_s: Real,
    /// `None` records a frame where no face was detected.
    pub observation: Option<FaceObservation>,
}

/// Frame source yielding recorded frames in order, then ending the
/// session.
#[derive(Debug)]
pub struct ReplaySource {
    frames: std::vec::IntoIter<RecordedFrame>,
}

impl ReplaySource {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for ReplaySource {
    type Frame = Option<FaceObservation>;

    fn acquire(&mut self) -> Option<(Self::Frame, FrameStamp)> {
        let frame = self.frames.next()?;
        Some((
            frame.observation,
            FrameStamp {
                t_mono_s: frame.t_mono_s,
                t_wall_s: frame.t_wall_s,
            },
        ))
    }
}

/// Pass-through detector for replayed frames.
#[derive(Debug, Default)]
pub struct ReplayDetector;

impl LandmarkDetector<Option<FaceObservation>> for ReplayDetector {
    fn detect(&mut self, frame: &Option<FaceObservation>, _ts_ms: u64) -> Option<FaceObservation> {
        *frame
    }
}
