//! Closed-form L2-regularized linear regression.

use nalgebra::{Cholesky, DMatrix, DVector};

use gaze_core::Real;

use crate::error::CalibrationError;

/// Coefficients and intercept for one target axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeFit {
    pub coefficients: DVector<Real>,
    pub intercept: Real,
}

impl RidgeFit {
    pub fn predict(&self, z: &DVector<Real>) -> Real {
        self.coefficients.dot(z) + self.intercept
    }
}

/// Solve `(Zc' Zc + lambda I) w = Zc' yc` over column-centered data.
///
/// Centering keeps the intercept out of the penalty; the returned
/// intercept reproduces uncentered predictions. `lambda` must be
/// positive: the expanded feature count can exceed the sample count,
/// and the penalty is what keeps that system well-posed.
pub fn ridge_fit(
    design: &DMatrix<Real>,
    targets: &DVector<Real>,
    lambda: Real,
) -> Result<RidgeFit, CalibrationError> {
    let n = design.nrows();
    let p = design.ncols();
    debug_assert_eq!(targets.len(), n);
    debug_assert!(lambda > 0.0);

    let col_means = DVector::<Real>::from_fn(p, |c, _| design.column(c).sum() / n as Real);
    let y_mean = targets.sum() / n as Real;

    let mut centered = design.clone();
    for c in 0..p {
        for v in centered.column_mut(c).iter_mut() {
            *v -= col_means[c];
        }
    }
    let yc = targets.map(|v| v - y_mean);

    let mut gram = centered.transpose() * &centered;
    for i in 0..p {
        gram[(i, i)] += lambda;
    }
    let rhs = centered.transpose() * yc;

    let chol = Cholesky::new(gram).ok_or(CalibrationError::Solve)?;
    let coefficients = chol.solve(&rhs);
    let intercept = y_mean - coefficients.dot(&col_means);

    Ok(RidgeFit {
        coefficients,
        intercept,
    })
}
