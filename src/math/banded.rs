//! Symmetric banded systems.
//!
//! Normal equations of a B-spline fit, `BᵀB + λ JᵀJ`, only couple
//! coefficients whose basis functions share a knot interval, so they are
//! banded with half-bandwidth `degree + 1`. Storing the lower band and
//! factoring with a band Cholesky keeps each solve `O(n · w²)` instead of the
//! `O(n³)` a dense factorization would cost.

/// Smallest pivot accepted by `cholesky`, relative to the largest diagonal entry.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Symmetric matrix stored as its lower band.
///
/// Entry `(i, j)` with `j <= i <= j + bandwidth` lives at
/// `data[i * (bandwidth + 1) + (i - j)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedSymmetric {
    n: usize,
    bandwidth: usize,
    data: Vec<f64>,
}

/// Lower Cholesky factor `L` of a `BandedSymmetric`, same layout.
#[derive(Debug, Clone)]
pub struct BandedCholesky {
    factor: BandedSymmetric,
}

impl BandedSymmetric {
    pub fn zeros(n: usize, bandwidth: usize) -> Self {
        Self {
            n,
            bandwidth,
            data: vec![0.0; n * (bandwidth + 1)],
        }
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    fn slot(&self, i: usize, j: usize) -> usize {
        debug_assert!(j <= i && i - j <= self.bandwidth);
        i * (self.bandwidth + 1) + (i - j)
    }

    /// `A(i, j)`, zero outside the band.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i >= j { (i, j) } else { (j, i) };
        if i - j > self.bandwidth {
            return 0.0;
        }
        self.data[self.slot(i, j)]
    }

    /// `A(i, j) += value` (and its mirror).
    ///
    /// Panics in debug builds if `(i, j)` falls outside the band.
    pub fn add(&mut self, i: usize, j: usize, value: f64) {
        let (i, j) = if i >= j { (i, j) } else { (j, i) };
        let slot = self.slot(i, j);
        self.data[slot] += value;
    }

    /// Accumulate `scale · v vᵀ` where `v` is zero outside `first..first + v.len()`.
    pub fn add_outer(&mut self, first: usize, v: &[f64], scale: f64) {
        for (a, &va) in v.iter().enumerate() {
            for (b, &vb) in v.iter().enumerate().take(a + 1) {
                self.add(first + a, first + b, scale * va * vb);
            }
        }
    }

    /// `self + weight · other`; both must share size and bandwidth.
    pub fn plus_scaled(&self, other: &Self, weight: f64) -> Self {
        debug_assert_eq!((self.n, self.bandwidth), (other.n, other.bandwidth));
        Self {
            n: self.n,
            bandwidth: self.bandwidth,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a + weight * b)
                .collect(),
        }
    }

    /// Band Cholesky factorization.
    ///
    /// Returns `None` when a pivot drops below `PIVOT_TOLERANCE · max diag`,
    /// i.e. the matrix is not numerically positive definite.
    pub fn cholesky(&self) -> Option<BandedCholesky> {
        let n = self.n;
        let w = self.bandwidth;
        let max_diag = (0..n).map(|i| self.get(i, i)).fold(0.0_f64, f64::max);
        if !(max_diag.is_finite() && max_diag > 0.0) {
            return None;
        }
        let floor = PIVOT_TOLERANCE * max_diag;

        let mut l = Self::zeros(n, w);
        for i in 0..n {
            let start = i.saturating_sub(w);
            for j in start..=i {
                let mut sum = self.get(i, j);
                for p in start..j {
                    sum -= l.get(i, p) * l.get(j, p);
                }
                let slot = l.slot(i, j);
                if i == j {
                    if !(sum > floor) {
                        return None;
                    }
                    l.data[slot] = sum.sqrt();
                } else {
                    l.data[slot] = sum / l.get(j, j);
                }
            }
        }
        Some(BandedCholesky { factor: l })
    }
}

impl BandedCholesky {
    /// Solve `A x = b` by forward then backward substitution.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let l = &self.factor;
        let n = l.n;
        let w = l.bandwidth;
        debug_assert_eq!(b.len(), n);

        let mut z = b.to_vec();
        for i in 0..n {
            let mut sum = z[i];
            for p in i.saturating_sub(w)..i {
                sum -= l.get(i, p) * z[p];
            }
            z[i] = sum / l.get(i, i);
        }

        for i in (0..n).rev() {
            let mut sum = z[i];
            for p in (i + 1)..n.min(i + w + 1) {
                sum -= l.get(p, i) * z[p];
            }
            z[i] = sum / l.get(i, i);
        }
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tridiagonal(n: usize) -> BandedSymmetric {
        let mut a = BandedSymmetric::zeros(n, 1);
        for i in 0..n {
            a.add(i, i, 4.0);
            if i > 0 {
                a.add(i, i - 1, 1.0);
            }
        }
        a
    }

    #[test]
    fn solves_tridiagonal_system() {
        let a = tridiagonal(5);
        let x = [1.0, -2.0, 3.0, 0.5, 2.0];
        let b: Vec<f64> = (0..5)
            .map(|i| (0..5).map(|j| a.get(i, j) * x[j]).sum())
            .collect();

        let solved = a.cholesky().unwrap().solve(&b);
        for (got, want) in solved.iter().zip(x) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn entries_outside_band_read_as_zero() {
        let a = tridiagonal(4);
        assert_eq!(a.get(0, 2), 0.0);
        assert_eq!(a.get(1, 0), a.get(0, 1));
    }

    #[test]
    fn outer_products_accumulate_symmetrically() {
        let mut a = BandedSymmetric::zeros(4, 2);
        a.add_outer(1, &[1.0, 2.0, 3.0], 2.0);
        assert_eq!(a.get(1, 1), 2.0);
        assert_eq!(a.get(3, 1), 6.0);
        assert_eq!(a.get(2, 3), 12.0);
        assert_eq!(a.get(0, 0), 0.0);
    }

    #[test]
    fn singular_matrix_has_no_factor() {
        // Rank one: [1 1; 1 1].
        let mut a = BandedSymmetric::zeros(2, 1);
        a.add_outer(0, &[1.0, 1.0], 1.0);
        assert!(a.cholesky().is_none());
        assert!(BandedSymmetric::zeros(3, 1).cholesky().is_none());
    }

    #[test]
    fn scaled_sum_combines_bands() {
        let a = tridiagonal(3);
        let sum = a.plus_scaled(&a, 0.5);
        assert_eq!(sum.get(1, 1), 6.0);
        assert_eq!(sum.get(1, 2), 1.5);
        assert_eq!(sum.dim(), 3);
    }
}
