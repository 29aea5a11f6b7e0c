//! B-spline curve (knot vector + control coefficients).

use serde::{Deserialize, Serialize};

use crate::math::bspline;

/// A fitted B-spline of the given degree.
///
/// `knots.len() == coefficients.len() + degree + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSpline {
    pub degree: usize,
    pub knots: Vec<f64>,
    pub coefficients: Vec<f64>,
}

impl BSpline {
    pub fn new(degree: usize, knots: Vec<f64>, coefficients: Vec<f64>) -> Self {
        debug_assert_eq!(knots.len(), coefficients.len() + degree + 1);
        Self {
            degree,
            knots,
            coefficients,
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        bspline::evaluate(&self.knots, &self.coefficients, self.degree, x)
    }

    /// Knots strictly inside the boundary knots.
    pub fn interior_knots(&self) -> &[f64] {
        let n = self.coefficients.len();
        &self.knots[self.degree + 1..n]
    }

    /// `[knots[degree], knots[n_coef]]`, the range the spline was fitted on.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.coefficients.len()])
    }
}
