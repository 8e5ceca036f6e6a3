//! Core primitives for gaze classification.
//!
//! This crate provides the building blocks shared by the calibration and
//! pipeline crates:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Vec2`),
//! - the domain types (`GazeState`, `FaceObservation`, `GazeSample`, ...),
//! - fixed-length feature extraction from a face observation,
//! - polygon-based area-of-interest hit testing,
//! - exponential smoothing of gaze points,
//! - the debounce state machine that turns raw per-frame classifications
//!   into a stability-confirmed stream.
//!
//! Everything here is pure computation: no I/O, no threads, no clocks.
//! Callers pass monotonic timestamps in explicitly, which keeps the
//! temporal logic deterministic and testable.

/// Area-of-interest polygon and hit testing.
mod aoi;
/// Fixed-length feature vectors derived from face observations.
mod features;
/// Exponential moving average smoothing.
mod filter;
/// Linear algebra type aliases.
mod math;
/// Debounce / hysteresis state machine.
mod state_machine;
/// Deterministic synthetic observations for tests and examples.
///
/// Public so calibration and pipeline tests across the workspace can share
/// one source of reproducible data; not intended for production use.
pub mod synthetic;
/// Domain data types.
mod types;

pub use aoi::*;
pub use features::*;
pub use filter::*;
pub use math::*;
pub use state_machine::*;
pub use types::*;
