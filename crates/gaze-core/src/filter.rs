//! Exponential moving average smoothing of gaze points.

use crate::math::Real;
use crate::types::GazePoint;

/// Per-axis EMA over successive predicted gaze points.
///
/// `alpha` in `(0, 1]` weights the newest value; smaller alpha trades
/// responsiveness for stability. The first update after construction or
/// [`reset`](Self::reset) passes its input through unchanged.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    alpha: Real,
    prev: Option<GazePoint>,
}

impl EmaFilter {
    pub fn new(alpha: Real) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0, "alpha must be in (0, 1]");
        Self { alpha, prev: None }
    }

    pub fn update(&mut self, raw: GazePoint) -> GazePoint {
        let smoothed = match self.prev {
            None => raw,
            Some(prev) => GazePoint::new(
                self.alpha * raw.x + (1.0 - self.alpha) * prev.x,
                self.alpha * raw.y + (1.0 - self.alpha) * prev.y,
            ),
        };
        self.prev = Some(smoothed);
        smoothed
    }

    /// Clear the seed so a new session never inherits stale state.
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_is_identity() {
        let mut f = EmaFilter::new(0.3);
        let p = GazePoint::new(0.2, 0.8);
        assert_eq!(f.update(p), p);
    }

    #[test]
    fn converges_to_constant_input() {
        let mut f = EmaFilter::new(0.3);
        f.update(GazePoint::new(0.0, 0.0));
        let target = GazePoint::new(1.0, 1.0);
        let mut out = GazePoint::new(0.0, 0.0);
        // Error shrinks by (1 - alpha) per step: 0.7^40 < 1e-6.
        for _ in 0..40 {
            out = f.update(target);
        }
        assert!((out.x - 1.0).abs() < 1e-6);
        assert!((out.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn smoothing_blends_per_axis() {
        let mut f = EmaFilter::new(0.5);
        f.update(GazePoint::new(0.0, 1.0));
        let out = f.update(GazePoint::new(1.0, 0.0));
        assert!((out.x - 0.5).abs() < 1e-12);
        assert!((out.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reset_clears_seed() {
        let mut f = EmaFilter::new(0.1);
        f.update(GazePoint::new(0.9, 0.9));
        f.reset();
        let p = GazePoint::new(0.1, 0.2);
        assert_eq!(f.update(p), p);
    }
}
