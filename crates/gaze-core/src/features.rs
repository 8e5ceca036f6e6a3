//! Fixed-length feature extraction for the gaze regressor.
//!
//! All values are in normalized camera-frame coordinates (0-1). The vector
//! is designed to be robust to small head translations by including iris
//! positions relative to their eye corners: a centered iris means "looking
//! straight" independent of where the face sits in the frame.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Real;
use crate::types::{EyeLandmarks, FaceObservation};

/// Number of components in every [`FeatureVector`]. Constant for the
/// process lifetime; fitted models record it and reject mismatches.
pub const FEATURE_LEN: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("non-finite feature value at component {0}")]
    NonFinite(usize),
}

/// Fixed-length, finite-valued feature vector.
///
/// Construction validates every component, so downstream numeric code can
/// assume finiteness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([Real; FEATURE_LEN]);

impl FeatureVector {
    pub fn new(values: [Real; FEATURE_LEN]) -> Result<Self, FeatureError> {
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite(i));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.0
    }

    pub fn to_dvector(&self) -> DVector<Real> {
        DVector::from_row_slice(&self.0)
    }
}

/// Relative iris position within one eye's bounding box, plus the box size.
fn eye_relative(eye: &EyeLandmarks) -> (Real, Real, Real, Real) {
    let x_min = eye.outer_corner.x.min(eye.inner_corner.x);
    let x_max = eye.outer_corner.x.max(eye.inner_corner.x);
    let y_min = eye.top_lid.y.min(eye.bottom_lid.y);
    let y_max = eye.top_lid.y.max(eye.bottom_lid.y);
    let ew = (x_max - x_min) + 1e-6;
    let eh = (y_max - y_min) + 1e-6;
    let rel_x = (eye.iris.x - x_min) / ew;
    let rel_y = (eye.iris.y - y_min) / eh;
    (rel_x, rel_y, ew, eh)
}

/// Extract the 20-component feature vector from one observation.
///
/// Deterministic and side-effect free. Fails only when the observation
/// carries non-finite coordinates; such frames must be treated as "no
/// features", not propagated into the regressor.
pub fn extract_features(face: &FaceObservation) -> Result<FeatureVector, FeatureError> {
    let (l_rx, l_ry, l_ew, l_eh) = eye_relative(&face.left_eye);
    let (r_rx, r_ry, r_ew, r_eh) = eye_relative(&face.right_eye);

    let li = face.left_eye.iris;
    let ri = face.right_eye.iris;

    FeatureVector::new([
        // Absolute iris positions
        li.x,
        li.y,
        ri.x,
        ri.y,
        // Eye-relative iris (gaze direction proxy)
        l_rx,
        l_ry,
        r_rx,
        r_ry,
        // Eye geometry (head-scale proxy)
        l_ew,
        l_eh,
        r_ew,
        r_eh,
        // Head position proxies
        face.nose.x,
        face.nose.y,
        face.chin.x,
        face.chin.y,
        face.forehead.x,
        face.forehead.y,
        // Mean iris position
        (li.x + ri.x) / 2.0,
        (li.y + ri.y) / 2.0,
    ])
}
