//! Real-time gaze classification pipeline.
//!
//! Wires the core stages (feature extraction, calibrated prediction,
//! smoothing, area classification, debouncing) into a producer thread
//! that pulls frames from an external source and publishes one
//! [`PipelineResult`] per frame through a bounded, never-blocking
//! channel. The consumer (typically a UI loop) drains at its own pace;
//! overflow is defined data loss, not an error.
//!
//! External collaborators are trait seams: [`FrameSource`] and
//! [`LandmarkDetector`] feed the pipeline, [`SessionSink`] receives the
//! per-frame samples and committed transition events for durable storage.

/// Pipeline configuration with documented defaults.
mod config;
/// The producer thread and its handle.
mod coordinator;
/// Persisted calibration profile record.
mod profile;
/// Replay source for recorded observation streams.
mod replay;
/// Per-frame output unit.
mod result;
/// Session sink trait and in-memory implementation.
mod sink;
/// Frame source and landmark detector traits.
mod source;
/// End-of-session statistics.
mod summary;

pub use config::*;
pub use coordinator::*;
pub use profile::*;
pub use replay::*;
pub use result::*;
pub use sink::*;
pub use source::*;
pub use summary::*;
