//! Per-feature standardization learned from the calibration sample set.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use gaze_core::Real;

/// Spread below this is treated as a constant feature.
const MIN_SPREAD: Real = 1e-12;

/// Zero-mean / unit-variance transform with parameters learned by
/// [`fit`](Self::fit). Constant features get scale 1 so they map to zero
/// instead of exploding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    means: Vec<Real>,
    scales: Vec<Real>,
}

impl Standardizer {
    /// Learn per-column mean and population standard deviation.
    pub fn fit(data: &DMatrix<Real>) -> Self {
        let n = data.nrows() as Real;
        let mut means = Vec::with_capacity(data.ncols());
        let mut scales = Vec::with_capacity(data.ncols());
        for c in 0..data.ncols() {
            let col = data.column(c);
            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean) * (v - mean)).sum::<Real>() / n;
            let std = var.sqrt();
            means.push(mean);
            scales.push(if std < MIN_SPREAD { 1.0 } else { std });
        }
        Self { means, scales }
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn transform_slice(&self, row: &[Real]) -> DVector<Real> {
        debug_assert_eq!(row.len(), self.means.len());
        DVector::from_iterator(
            row.len(),
            row.iter()
                .zip(self.means.iter().zip(self.scales.iter()))
                .map(|(v, (m, s))| (v - m) / s),
        )
    }

    pub fn transform(&self, data: &DMatrix<Real>) -> DMatrix<Real> {
        let mut out = data.clone();
        for c in 0..out.ncols() {
            let m = self.means[c];
            let s = self.scales[c];
            for v in out.column_mut(c).iter_mut() {
                *v = (*v - m) / s;
            }
        }
        out
    }

    /// Rebuild from serialized parameters. Lengths must already agree;
    /// the model layer validates them against its feature length.
    pub fn from_parts(means: Vec<Real>, scales: Vec<Real>) -> Self {
        Self { means, scales }
    }

    pub fn means(&self) -> &[Real] {
        &self.means
    }

    pub fn scales(&self) -> &[Real] {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_to_zero_mean_unit_variance() {
        let data = DMatrix::from_row_slice(4, 2, &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0]);
        let scaler = Standardizer::fit(&data);
        let z = scaler.transform(&data);
        for c in 0..2 {
            let mean: Real = z.column(c).sum() / 4.0;
            let var: Real = z.column(c).iter().map(|v| v * v).sum::<Real>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let data = DMatrix::from_row_slice(3, 1, &[0.7, 0.7, 0.7]);
        let scaler = Standardizer::fit(&data);
        let z = scaler.transform(&data);
        assert!(z.column(0).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn transform_slice_matches_matrix_transform() {
        let data = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 7.0, 3.0, 9.0]);
        let scaler = Standardizer::fit(&data);
        let z = scaler.transform(&data);
        let row = scaler.transform_slice(&[2.0, 7.0]);
        assert!((row[0] - z[(1, 0)]).abs() < 1e-12);
        assert!((row[1] - z[(1, 1)]).abs() < 1e-12);
    }
}
