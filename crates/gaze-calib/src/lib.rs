//! Per-person gaze calibration model.
//!
//! Maps eye feature vectors to normalized screen coordinates with two
//! independently fitted axis regressors, each a composed pipeline of
//! standardization, polynomial feature expansion, and L2-regularized
//! linear regression. Regularization is fixed and non-zero: after
//! expansion the feature count can exceed the calibration sample count,
//! where an unpenalized fit is guaranteed to overfit.
//!
//! Fitted models serialize to an explicit, versioned parameter dump
//! ([`FittedParams`]): the degree, standardization parameters and
//! coefficients actually used, so a reloaded model cannot silently
//! diverge from the one that was fit.

mod error;
/// The fit/predict model and its serialized parameter form.
mod model;
/// Polynomial feature expansion.
mod poly;
/// Closed-form ridge regression.
mod ridge;
/// Calibration sample collection and target grids.
mod samples;
/// Per-feature standardization.
mod scaler;

pub use error::*;
pub use model::*;
pub use poly::*;
pub use ridge::*;
pub use samples::*;
pub use scaler::*;
