use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    /// Fatal to this fit attempt only; the caller should re-collect samples.
    #[error("insufficient calibration data: got {got} samples, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    /// Prediction requested before a successful fit (or after a failed one).
    #[error("gaze model has not been calibrated")]
    NotCalibrated,

    #[error("non-finite value in calibration sample {index}")]
    NonFiniteSample { index: usize },

    #[error("feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("unsupported model schema version {found} (newest supported is {supported})")]
    SchemaVersion { found: u32, supported: u32 },

    /// Regularized normal equations failed to decompose.
    #[error("ridge system is not positive definite")]
    Solve,
}
