//! B-spline primitives.
//!
//! Conventions:
//! - `knots` has length `n_coef + degree + 1` and is non-decreasing
//! - the spline is defined on `[knots[degree], knots[n_coef]]`; outside that
//!   range the boundary polynomial pieces are extended
//!
//! Basis values use the Cox–de Boor triangular recursion, which evaluates the
//! polynomial piece of the chosen span and therefore extrapolates naturally.

/// Index `l` of the knot span used to evaluate at `x`.
///
/// Returns `l` in `[degree, n_coef - 1]` with `knots[l] <= x < knots[l + 1]`
/// inside the domain, clamped to the first/last span outside it.
pub fn find_span(knots: &[f64], degree: usize, n_coef: usize, x: f64) -> usize {
    let last = n_coef - 1;
    if x >= knots[n_coef] {
        return last;
    }
    if x <= knots[degree] {
        return degree;
    }
    let offset = knots[degree..=n_coef].partition_point(|&t| t <= x);
    (degree + offset - 1).clamp(degree, last)
}

/// The `degree + 1` basis functions that may be non-zero on `span`, evaluated at `x`.
///
/// Entry `r` belongs to basis function `span - degree + r`.
pub fn basis_functions(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom != 0.0 { n[r] / denom } else { 0.0 };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// Evaluate `Σ c_i B_i(x)`.
pub fn evaluate(knots: &[f64], coefficients: &[f64], degree: usize, x: f64) -> f64 {
    let n_coef = coefficients.len();
    let span = find_span(knots, degree, n_coef, x);
    let basis = basis_functions(knots, degree, span, x);
    basis
        .iter()
        .enumerate()
        .map(|(r, b)| b * coefficients[span - degree + r])
        .sum()
}

/// Value of the `degree`-th derivative of basis function `i` on knot interval `l`.
///
/// A degree-`k` B-spline is a polynomial of degree `k` on each interval, so its
/// `k`-th derivative is piecewise constant. Interval `l` must be non-empty.
pub fn top_derivative(knots: &[f64], i: usize, degree: usize, l: usize) -> f64 {
    if degree == 0 {
        return if i == l { 1.0 } else { 0.0 };
    }
    let a = knots[i + degree] - knots[i];
    let b = knots[i + degree + 1] - knots[i + 1];
    let left = if a > 0.0 {
        top_derivative(knots, i, degree - 1, l) / a
    } else {
        0.0
    };
    let right = if b > 0.0 {
        top_derivative(knots, i + 1, degree - 1, l) / b
    } else {
        0.0
    };
    degree as f64 * (left - right)
}

/// Rows of the discontinuity matrix: for each interior knot `knots[q]`
/// (`degree < q < n_coef`), the jump of the `degree`-th derivative of every basis
/// function across that knot.
///
/// Interior knots must be simple (strictly between their neighbours).
pub fn derivative_jumps(knots: &[f64], degree: usize, n_coef: usize) -> Vec<Vec<f64>> {
    let mut rows = Vec::new();
    for q in (degree + 1)..n_coef {
        let mut row = vec![0.0; n_coef];
        let first = q.saturating_sub(degree + 1);
        for (i, slot) in row.iter_mut().enumerate().take(q + 1).skip(first) {
            let after = top_derivative(knots, i, degree, q);
            let before = top_derivative(knots, i, degree, q - 1);
            *slot = after - before;
        }
        rows.push(row);
    }
    rows
}
