//! Least-squares polynomial fitting.
//!
//! Conditioning:
//! - x is mapped onto the window `[-1, 1]` before building the Vandermonde matrix
//! - each Vandermonde column is scaled to unit norm
//! - singular values below `n · ε · σ_max` are dropped
//!
//! The coefficients are mapped back to the plain power basis in x afterwards,
//! so the reported polynomial can be evaluated directly on the input units.

use nalgebra::{DMatrix, DVector};

use crate::domain::{CurveModel, FitDiagnostics, FitQuality, FitResult, FitSpec, SampleSeries};
use crate::error::FitError;
use crate::fit::{Fitter, check_samples};
use crate::math::solve_least_squares;
use crate::models::Polynomial;

/// Fixed-degree polynomial strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolynomialFitter {
    pub degree: usize,
}

impl Fitter for PolynomialFitter {
    fn spec(&self) -> FitSpec {
        FitSpec::Polynomial {
            degree: self.degree,
        }
    }

    fn fit(&self, series: &SampleSeries) -> Result<FitResult, FitError> {
        fit_polynomial(series.x(), series.y(), self.degree)
    }
}

/// Fit a polynomial of `degree` to `(x, y)` by least squares.
///
/// Coefficients in the result are ordered lowest power first.
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<FitResult, FitError> {
    check_samples(x, y)?;
    let n = x.len();
    if n < degree + 1 {
        return Err(FitError::Underdetermined { samples: n, degree });
    }

    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let half_width = (hi - lo) / 2.0;
    if degree > 0 && !(half_width > 0.0) {
        return Err(FitError::DegenerateDomain { degree });
    }
    let half_width = if half_width > 0.0 { half_width } else { 1.0 };
    let center = (lo + hi) / 2.0;

    // u = offset + scale·x maps [lo, hi] onto [-1, 1].
    let offset = -center / half_width;
    let scale = 1.0 / half_width;

    let cols = degree + 1;
    let mut vander = DMatrix::<f64>::zeros(n, cols);
    for (i, &xi) in x.iter().enumerate() {
        let u = offset + scale * xi;
        let mut power = 1.0;
        for j in 0..cols {
            vander[(i, j)] = power;
            power *= u;
        }
    }

    let norms: Vec<f64> = (0..cols)
        .map(|j| {
            let norm = vander.column(j).norm();
            if norm > 0.0 { norm } else { 1.0 }
        })
        .collect();
    for (j, &norm) in norms.iter().enumerate() {
        let mut col = vander.column_mut(j);
        col /= norm;
    }

    let rcond = n as f64 * f64::EPSILON;
    let rhs = DVector::from_column_slice(y);
    let solution = solve_least_squares(&vander, &rhs, rcond).ok_or_else(|| {
        FitError::Solver(format!("degree-{degree} Vandermonde system has no usable solution"))
    })?;

    let window_coefficients: Vec<f64> = solution
        .beta
        .iter()
        .zip(&norms)
        .map(|(c, norm)| c / norm)
        .collect();
    let polynomial = Polynomial::new(window_coefficients).compose_linear(offset, scale);

    if solution.rank < cols {
        tracing::warn!(
            degree,
            rank = solution.rank,
            "polynomial fit is rank deficient; coefficients are not unique"
        );
    }

    let model = CurveModel::Polynomial(polynomial);
    let quality = FitQuality::measure(&model, x, y);
    tracing::debug!(degree, n, sse = quality.sse, rank = solution.rank, "polynomial fit");

    Ok(FitResult {
        spec: FitSpec::Polynomial { degree },
        model,
        quality,
        diagnostics: FitDiagnostics::Polynomial {
            rank: solution.rank,
            singular_values: solution.singular_values,
            rcond,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn coefficients(fit: &FitResult) -> &[f64] {
        match &fit.model {
            CurveModel::Polynomial(p) => &p.coefficients,
            CurveModel::Spline(_) => panic!("expected polynomial"),
        }
    }

    #[test]
    fn degree_zero_is_mean() {
        let x = [0.3, 1.0, 2.5, 7.0, 8.0];
        let y = [1.0, 4.0, -2.0, 10.0, 0.5];
        let fit = fit_polynomial(&x, &y, 0).unwrap();
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        assert_eq!(coefficients(&fit).len(), 1);
        assert_abs_diff_eq!(coefficients(&fit)[0], mean, epsilon = 1e-12);
    }

    #[test]
    fn degree_zero_accepts_single_sample_and_constant_x() {
        let fit = fit_polynomial(&[2.0, 2.0], &[1.0, 3.0], 0).unwrap();
        assert_abs_diff_eq!(coefficients(&fit)[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn degree_one_recovers_line_exactly() {
        let fit = fit_polynomial(&[0.0, 1.0, 2.0, 3.0], &[0.0, 2.0, 4.0, 6.0], 1).unwrap();
        let c = coefficients(&fit);
        assert_abs_diff_eq!(c[0], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c[1], 2.0, epsilon = 1e-10);
        assert!(fit.quality.sse < 1e-20);
        match &fit.diagnostics {
            FitDiagnostics::Polynomial { rank, singular_values, .. } => {
                assert_eq!(*rank, 2);
                assert_eq!(singular_values.len(), 2);
            }
            other => panic!("unexpected diagnostics {other:?}"),
        }
    }

    #[test]
    fn quadratic_on_offset_domain() {
        // Large x offset exercises the domain mapping.
        let x: Vec<f64> = (0..20).map(|i| 1000.0 + i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| 3.0 - 0.25 * v + 0.001 * v * v).collect();
        let fit = fit_polynomial(&x, &y, 2).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert_abs_diff_eq!(fit.evaluate(xi), yi, epsilon = 1e-6);
        }
    }

    #[test]
    fn mismatched_or_non_finite_samples_are_rejected() {
        let err = fit_polynomial(&[0.0, 1.0, 2.0], &[1.0, 2.0], 1).unwrap_err();
        assert_eq!(err, FitError::LengthMismatch { x_len: 3, y_len: 2 });

        let err = fit_polynomial(&[0.0, f64::NAN, 2.0], &[1.0, 2.0, 3.0], 1).unwrap_err();
        assert_eq!(err, FitError::NonFiniteSample { index: 1 });

        let err = fit_polynomial(&[0.0, 1.0, 2.0], &[1.0, 2.0, f64::INFINITY], 1).unwrap_err();
        assert_eq!(err, FitError::NonFiniteSample { index: 2 });
    }

    #[test]
    fn too_few_samples_is_underdetermined() {
        let err = fit_polynomial(&[0.0, 1.0], &[1.0, 2.0], 2).unwrap_err();
        assert_eq!(err, FitError::Underdetermined { samples: 2, degree: 2 });
    }

    #[test]
    fn constant_x_rejected_for_degree_one() {
        let err = fit_polynomial(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 1).unwrap_err();
        assert_eq!(err, FitError::DegenerateDomain { degree: 1 });
    }

    #[test]
    fn fitter_trait_reports_spec() {
        let series = SampleSeries::new(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]).unwrap();
        let fitter = PolynomialFitter { degree: 1 };
        let fit = fitter.fit(&series).unwrap();
        assert_eq!(fit.spec, fitter.spec());
        assert_abs_diff_eq!(fit.evaluate(10.0), 21.0, epsilon = 1e-9);
    }
}
