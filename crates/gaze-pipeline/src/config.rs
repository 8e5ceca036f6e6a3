//! Pipeline configuration.
//!
//! All parameters are injected at coordinator construction and never
//! mutated mid-session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gaze_core::Real;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("min_confidence must be in [0, 1], got {0}")]
    MinConfidence(Real),
    #[error("ema_alpha must be in (0, 1], got {0}")]
    EmaAlpha(Real),
    #[error("stable_ms must be positive, got {0}")]
    StableMs(Real),
    #[error("auto_pause_s must be positive, got {0}")]
    AutoPause(Real),
    #[error("channel_capacity must be at least 1")]
    ChannelCapacity,
    #[error("calibration degree must be at least 1, got {0}")]
    Degree(usize),
    #[error("ridge_lambda must be positive, got {0}")]
    RidgeLambda(Real),
}

/// Parameters of the calibration model and its quality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Polynomial degree of the gaze regression.
    pub degree: usize,
    /// Fixed L2 penalty of the regression.
    pub ridge_lambda: Real,
    /// Warn the operator when the fit RMS exceeds this (normalized units).
    pub rms_warn_threshold: Real,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            degree: 2,
            ridge_lambda: 1.0,
            rms_warn_threshold: 0.05,
        }
    }
}

/// Runtime parameters of the classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Frames with confidence below this classify as UNKNOWN.
    pub min_confidence: Real,
    /// EMA weight of the newest gaze sample (higher = more responsive).
    pub ema_alpha: Real,
    /// Milliseconds a candidate state must be stable before committing.
    pub stable_ms: Real,
    /// Seconds without a usable face before the session flags auto-pause.
    pub auto_pause_s: Real,
    /// Capacity of the result channel to the consumer; overflow drops.
    pub channel_capacity: usize,
    pub calibration: CalibrationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.30,
            ema_alpha: 0.30,
            stable_ms: 200.0,
            auto_pause_s: 3.0,
            channel_capacity: 5,
            calibration: CalibrationConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::MinConfidence(self.min_confidence));
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(ConfigError::EmaAlpha(self.ema_alpha));
        }
        if !(self.stable_ms > 0.0) {
            return Err(ConfigError::StableMs(self.stable_ms));
        }
        if !(self.auto_pause_s > 0.0) {
            return Err(ConfigError::AutoPause(self.auto_pause_s));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ChannelCapacity);
        }
        if self.calibration.degree == 0 {
            return Err(ConfigError::Degree(self.calibration.degree));
        }
        if !(self.calibration.ridge_lambda > 0.0) {
            return Err(ConfigError::RidgeLambda(self.calibration.ridge_lambda));
        }
        Ok(())
    }
}
