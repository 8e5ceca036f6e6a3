//! Trait seams to the external frame source and landmark detector.
//!
//! Both resources are single-owner: only the coordinator thread touches
//! them, which keeps non-thread-safe detector implementations sound.

use gaze_core::{FaceObservation, Real};

/// Timestamps attached to one acquired frame.
///
/// Monotonic seconds drive every duration comparison in the pipeline;
/// wall seconds exist for display and audit only and never enter a
/// duration computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStamp {
    pub t_mono_s: Real,
    pub t_wall_s: Real,
}

/// Supplier of frames, the only blocking call in a pipeline iteration.
///
/// A live implementation waits for the next camera frame; a replay
/// implementation returns records at file pace. `None` means the source
/// is exhausted and ends the session.
pub trait FrameSource {
    type Frame;

    fn acquire(&mut self) -> Option<(Self::Frame, FrameStamp)>;
}

/// External landmark model: image in, at most one face observation out.
///
/// `ts_ms` is strictly increasing across calls within a session (video
/// trackers require it). "No observation" is a normal per-frame outcome,
/// not an error.
pub trait LandmarkDetector<F> {
    fn detect(&mut self, frame: &F, ts_ms: u64) -> Option<FaceObservation>;
}
