//! Least squares solver.
//!
//! Both fit strategies reduce to problems of the form:
//!
//! ```text
//! minimize ‖A β − b‖²
//! ```
//!
//! - polynomial: `A` is the (scaled) Vandermonde matrix
//! - spline: `A` is the B-spline collocation matrix, optionally stacked on top of
//!   the weighted third-derivative jump matrix (only when the banded normal
//!   equations in `math::banded` turn out singular)
//!
//! We solve with an SVD so tall and rank-deficient systems are handled without
//! panicking. (Nalgebra's `QR::solve` is intended for square systems.)

use nalgebra::{DMatrix, DVector};

/// Solution of a least squares problem plus the spectrum used to obtain it.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub beta: DVector<f64>,
    /// Singular values of `A`, sorted descending.
    pub singular_values: Vec<f64>,
    /// Number of singular values above the cutoff.
    pub rank: usize,
}

/// Solve `min ‖A β − b‖²` with a relative singular value cutoff.
///
/// Singular values below `rcond * σ_max` are treated as zero. Returns `None` if
/// the system has no usable singular values or the solution is not finite.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>, rcond: f64) -> Option<LeastSquares> {
    if a.nrows() == 0 || a.ncols() == 0 {
        return None;
    }

    let svd = a.clone().svd(true, true);

    let mut singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    singular_values.sort_by(|x, y| y.total_cmp(x));
    let sigma_max = singular_values.first().copied().unwrap_or(0.0);
    if !(sigma_max.is_finite() && sigma_max > 0.0) {
        return None;
    }

    let eps = rcond * sigma_max;
    let rank = svd.rank(eps);
    let beta = svd.solve(b, eps).ok()?;
    if !beta.iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(LeastSquares {
        beta,
        singular_values,
        rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let sol = solve_least_squares(&x, &y, 1e-12).unwrap();
        assert!((sol.beta[0] - 2.0).abs() < 1e-10);
        assert!((sol.beta[1] - 3.0).abs() < 1e-10);
        assert_eq!(sol.rank, 2);
        assert!(sol.singular_values[0] >= sol.singular_values[1]);
    }

    #[test]
    fn rank_deficient_system_reports_rank() {
        // Two identical columns.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let sol = solve_least_squares(&x, &y, 1e-12).unwrap();
        assert_eq!(sol.rank, 1);
        // Minimum-norm solution splits the weight evenly.
        assert!((sol.beta[0] - 1.0).abs() < 1e-10);
        assert!((sol.beta[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn zero_matrix_is_rejected() {
        let x = DMatrix::<f64>::zeros(2, 2);
        let y = DVector::from_row_slice(&[1.0, 1.0]);
        assert!(solve_least_squares(&x, &y, 1e-12).is_none());
    }
}
