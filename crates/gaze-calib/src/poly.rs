//! Polynomial feature expansion.
//!
//! Emits every monomial of total degree 1..=d over the input features,
//! with no bias column (the regressor fits its own intercept). Degree 2
//! over standardized features captures the eyeball/perspective curvature
//! of the gaze mapping without overfitting small calibration sets.

use nalgebra::DVector;

use gaze_core::Real;

#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialExpansion {
    degree: usize,
    input_len: usize,
    /// Index multisets, one per output monomial, in generation order.
    terms: Vec<Vec<usize>>,
}

impl PolynomialExpansion {
    pub fn new(degree: usize, input_len: usize) -> Self {
        fn emit(terms: &mut Vec<Vec<usize>>, prefix: &mut Vec<usize>, start: usize, n: usize, left: usize) {
            if left == 0 {
                terms.push(prefix.clone());
                return;
            }
            for i in start..n {
                prefix.push(i);
                emit(terms, prefix, i, n, left - 1);
                prefix.pop();
            }
        }

        let mut terms = Vec::new();
        let mut prefix = Vec::new();
        for d in 1..=degree {
            emit(&mut terms, &mut prefix, 0, input_len, d);
        }
        Self {
            degree,
            input_len,
            terms,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Number of output monomials for this degree and input length.
    pub fn output_len(&self) -> usize {
        self.terms.len()
    }

    pub fn expand(&self, x: &DVector<Real>) -> DVector<Real> {
        debug_assert_eq!(x.len(), self.input_len);
        DVector::from_iterator(
            self.terms.len(),
            self.terms
                .iter()
                .map(|term| term.iter().map(|&i| x[i]).product::<Real>()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_len_matches_closed_form() {
        // sum_d C(n + d - 1, d) for d = 1..=2 is n + n(n+1)/2.
        let n = 20;
        let exp = PolynomialExpansion::new(2, n);
        assert_eq!(exp.output_len(), n + n * (n + 1) / 2);

        let exp1 = PolynomialExpansion::new(1, 5);
        assert_eq!(exp1.output_len(), 5);
    }

    #[test]
    fn degree_two_terms_for_two_inputs() {
        let exp = PolynomialExpansion::new(2, 2);
        let x = DVector::from_row_slice(&[2.0, 3.0]);
        let z = exp.expand(&x);
        // x0, x1, x0^2, x0*x1, x1^2
        assert_eq!(z.as_slice(), &[2.0, 3.0, 4.0, 6.0, 9.0]);
    }

    #[test]
    fn degree_three_includes_cubics() {
        let exp = PolynomialExpansion::new(3, 2);
        let x = DVector::from_row_slice(&[2.0, 3.0]);
        let z = exp.expand(&x);
        // 2 linear + 3 quadratic + 4 cubic terms.
        assert_eq!(z.len(), 9);
        assert_eq!(z[5], 8.0); // x0^3
        assert_eq!(z[8], 27.0); // x1^3
    }

    #[test]
    fn expansion_is_stable_across_instances() {
        let a = PolynomialExpansion::new(2, 6);
        let b = PolynomialExpansion::new(2, 6);
        let x = DVector::from_fn(6, |i, _| (i as Real) * 0.3 - 1.0);
        assert_eq!(a.expand(&x), b.expand(&x));
    }
}
