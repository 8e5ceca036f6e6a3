//! The calibration model: fit, predict, and the serialized parameter form.

use log::info;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use gaze_core::{FeatureVector, GazePoint, Real, FEATURE_LEN};

use crate::error::CalibrationError;
use crate::poly::PolynomialExpansion;
use crate::ridge::{ridge_fit, RidgeFit};
use crate::samples::CalibrationSample;
use crate::scaler::Standardizer;

/// Bumped whenever [`FittedParams`] changes shape. Loading a newer
/// version than this is refused instead of misread.
pub const MODEL_SCHEMA_VERSION: u32 = 1;

/// Coefficients for one screen axis, in expansion-term order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisParams {
    pub coefficients: Vec<Real>,
    pub intercept: Real,
}

/// Explicit, versioned dump of everything a fitted model uses: the
/// polynomial degree, the standardization parameters actually learned,
/// and the per-axis ridge coefficients. A model rebuilt from this record
/// predicts identically to the one that was fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedParams {
    pub schema_version: u32,
    pub degree: usize,
    pub lambda: Real,
    pub feature_len: usize,
    pub feature_means: Vec<Real>,
    pub feature_scales: Vec<Real>,
    pub x_axis: AxisParams,
    pub y_axis: AxisParams,
}

#[derive(Debug, Clone)]
struct Fitted {
    scaler: Standardizer,
    expansion: PolynomialExpansion,
    x_axis: RidgeFit,
    y_axis: RidgeFit,
}

/// Maps eye feature vectors to normalized screen coordinates.
///
/// Two independent axis regressors allow a better fit along each screen
/// axis. Immutable once fit: a failed [`fit`](Self::fit) leaves the
/// mapper unfitted rather than falling back to stale parameters.
#[derive(Debug, Clone)]
pub struct GazeMapper {
    degree: usize,
    lambda: Real,
    fitted: Option<Fitted>,
}

impl GazeMapper {
    pub fn new(degree: usize, lambda: Real) -> Self {
        Self {
            degree,
            lambda,
            fitted: None,
        }
    }

    /// Minimum sample count for a degree-`d` fit: the coefficient count of
    /// a 2-D polynomial surface of that degree (3, 6, 10, ...). Below this
    /// the system is rank-deficient in the directions that matter even
    /// with the ridge penalty.
    pub fn min_samples(degree: usize) -> usize {
        (degree + 1) * (degree + 2) / 2
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn lambda(&self) -> Real {
        self.lambda
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Fit both axes and return the RMS training residual in normalized
    /// screen units. Callers should warn the operator when it exceeds
    /// their configured threshold.
    pub fn fit(&mut self, samples: &[CalibrationSample]) -> Result<Real, CalibrationError> {
        // A failed attempt must not leave stale parameters behind.
        self.fitted = None;

        let need = Self::min_samples(self.degree);
        if samples.len() < need {
            return Err(CalibrationError::InsufficientData {
                got: samples.len(),
                need,
            });
        }
        for (i, s) in samples.iter().enumerate() {
            if !(s.target.x.is_finite() && s.target.y.is_finite()) {
                return Err(CalibrationError::NonFiniteSample { index: i });
            }
        }

        let n = samples.len();
        let raw = DMatrix::from_fn(n, FEATURE_LEN, |r, c| samples[r].features.as_slice()[c]);
        let scaler = Standardizer::fit(&raw);
        let expansion = PolynomialExpansion::new(self.degree, FEATURE_LEN);

        let rows: Vec<DVector<Real>> = samples
            .iter()
            .map(|s| expansion.expand(&scaler.transform_slice(s.features.as_slice())))
            .collect();
        let design = DMatrix::from_fn(n, expansion.output_len(), |r, c| rows[r][c]);

        let tx = DVector::from_fn(n, |r, _| samples[r].target.x);
        let ty = DVector::from_fn(n, |r, _| samples[r].target.y);

        let x_axis = ridge_fit(&design, &tx, self.lambda)?;
        let y_axis = ridge_fit(&design, &ty, self.lambda)?;

        let mut sq_sum = 0.0;
        for (r, z) in rows.iter().enumerate() {
            let dx = x_axis.predict(z) - tx[r];
            let dy = y_axis.predict(z) - ty[r];
            sq_sum += dx * dx + dy * dy;
        }
        let rms = (sq_sum / n as Real).sqrt();
        info!("gaze mapper fitted: rms={:.4} n={}", rms, n);

        self.fitted = Some(Fitted {
            scaler,
            expansion,
            x_axis,
            y_axis,
        });
        Ok(rms)
    }

    /// Predict the normalized screen point, clamped to `[0,1]^2`.
    pub fn predict(&self, features: &FeatureVector) -> Result<GazePoint, CalibrationError> {
        let fitted = self.fitted.as_ref().ok_or(CalibrationError::NotCalibrated)?;
        let z = fitted
            .expansion
            .expand(&fitted.scaler.transform_slice(features.as_slice()));
        let x = fitted.x_axis.predict(&z);
        let y = fitted.y_axis.predict(&z);
        Ok(GazePoint::new(x, y).clamped())
    }

    /// Export the fitted parameters. `NotCalibrated` before a fit.
    pub fn to_params(&self) -> Result<FittedParams, CalibrationError> {
        let fitted = self.fitted.as_ref().ok_or(CalibrationError::NotCalibrated)?;
        Ok(FittedParams {
            schema_version: MODEL_SCHEMA_VERSION,
            degree: self.degree,
            lambda: self.lambda,
            feature_len: FEATURE_LEN,
            feature_means: fitted.scaler.means().to_vec(),
            feature_scales: fitted.scaler.scales().to_vec(),
            x_axis: AxisParams {
                coefficients: fitted.x_axis.coefficients.as_slice().to_vec(),
                intercept: fitted.x_axis.intercept,
            },
            y_axis: AxisParams {
                coefficients: fitted.y_axis.coefficients.as_slice().to_vec(),
                intercept: fitted.y_axis.intercept,
            },
        })
    }

    /// Rebuild a fitted mapper from a parameter dump, validating the
    /// schema version and every dimension before accepting it.
    pub fn from_params(params: FittedParams) -> Result<Self, CalibrationError> {
        if params.schema_version > MODEL_SCHEMA_VERSION {
            return Err(CalibrationError::SchemaVersion {
                found: params.schema_version,
                supported: MODEL_SCHEMA_VERSION,
            });
        }
        if params.feature_len != FEATURE_LEN {
            return Err(CalibrationError::DimensionMismatch {
                expected: FEATURE_LEN,
                got: params.feature_len,
            });
        }
        for len in [params.feature_means.len(), params.feature_scales.len()] {
            if len != FEATURE_LEN {
                return Err(CalibrationError::DimensionMismatch {
                    expected: FEATURE_LEN,
                    got: len,
                });
            }
        }

        let expansion = PolynomialExpansion::new(params.degree, FEATURE_LEN);
        for axis in [&params.x_axis, &params.y_axis] {
            if axis.coefficients.len() != expansion.output_len() {
                return Err(CalibrationError::DimensionMismatch {
                    expected: expansion.output_len(),
                    got: axis.coefficients.len(),
                });
            }
        }

        let scaler = Standardizer::from_parts(params.feature_means, params.feature_scales);
        let x_axis = RidgeFit {
            coefficients: DVector::from_vec(params.x_axis.coefficients),
            intercept: params.x_axis.intercept,
        };
        let y_axis = RidgeFit {
            coefficients: DVector::from_vec(params.y_axis.coefficients),
            intercept: params.y_axis.intercept,
        };

        Ok(Self {
            degree: params.degree,
            lambda: params.lambda,
            fitted: Some(Fitted {
                scaler,
                expansion,
                x_axis,
                y_axis,
            }),
        })
    }
}
