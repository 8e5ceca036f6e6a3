//! Calibration sample collection.
//!
//! During the calibration routine the operator fixates a sequence of
//! on-screen targets while raw observations stream in. All raw feature
//! vectors captured for one target are averaged into a single
//! [`CalibrationSample`], so a target that happened to collect more frames
//! cannot dominate the fit by sample count.

use serde::{Deserialize, Serialize};

use gaze_core::{FeatureVector, GazePoint, Real, FEATURE_LEN};

/// One (feature vector, target point) pair, plus the number of raw
/// observations averaged into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub features: FeatureVector,
    pub target: GazePoint,
    pub observation_count: usize,
}

/// Accumulates raw feature vectors for a single on-screen target.
#[derive(Debug, Clone)]
pub struct TargetCollector {
    target: GazePoint,
    sums: [Real; FEATURE_LEN],
    count: usize,
}

impl TargetCollector {
    pub fn new(target: GazePoint) -> Self {
        Self {
            target,
            sums: [0.0; FEATURE_LEN],
            count: 0,
        }
    }

    pub fn push(&mut self, features: &FeatureVector) {
        for (sum, v) in self.sums.iter_mut().zip(features.as_slice()) {
            *sum += v;
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Average the accumulated observations into one sample. `None` when
    /// nothing was collected (the target should then be skipped, as the
    /// calibration routine does when the face was lost for a whole dot).
    pub fn commit(self) -> Option<CalibrationSample> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as Real;
        let mut mean = self.sums;
        for v in mean.iter_mut() {
            *v /= n;
        }
        let features = FeatureVector::new(mean).ok()?;
        Some(CalibrationSample {
            features,
            target: self.target,
            observation_count: self.count,
        })
    }
}

/// The canonical 3x3 grid of normalized calibration targets.
pub fn calibration_grid() -> Vec<GazePoint> {
    const COORDS: [Real; 3] = [0.1, 0.5, 0.9];
    let mut points = Vec::with_capacity(9);
    for &y in &COORDS {
        for &x in &COORDS {
            points.push(GazePoint::new(x, y));
        }
    }
    points
}
