//! Curve fitting.
//!
//! Two strategies sit behind the `Fitter` trait:
//!
//! - `PolynomialFitter`: least-squares polynomial of fixed degree
//! - `SplineFitter`: cubic smoothing spline with a residual budget `s`
//!
//! Both return a `FitResult` whose model can be evaluated anywhere on the real
//! line; outside the training range the curve is extrapolated.

pub mod polynomial;
pub mod spline;

pub use polynomial::*;
pub use spline::*;

use crate::domain::{FitResult, FitSpec, SampleSeries};
use crate::error::FitError;

/// A fit strategy with its tuning parameter bound.
pub trait Fitter {
    fn spec(&self) -> FitSpec;
    fn fit(&self, series: &SampleSeries) -> Result<FitResult, FitError>;
}

/// Strategy object for `spec`.
pub fn fitter_for(spec: FitSpec) -> Box<dyn Fitter> {
    match spec {
        FitSpec::Polynomial { degree } => Box::new(PolynomialFitter { degree }),
        FitSpec::Spline { smoothing } => Box::new(SplineFitter { smoothing }),
    }
}

/// Fit `series` with the strategy described by `spec`.
pub fn fit_curve(series: &SampleSeries, spec: FitSpec) -> Result<FitResult, FitError> {
    let fitter = fitter_for(spec);
    tracing::info!(fit = %spec.describe(), samples = series.len(), "fitting");
    fitter.fit(series)
}

/// Evaluate a fitted curve at each of `xs`.
pub fn evaluate(fit: &FitResult, xs: &[f64]) -> Vec<f64> {
    xs.iter().map(|&x| fit.evaluate(x)).collect()
}

/// Reject sample slices no fit can use: unequal lengths or NaN/inf values.
///
/// `SampleSeries` already guarantees both; this covers callers handing raw slices.
pub(crate) fn check_samples(x: &[f64], y: &[f64]) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    match x.iter().zip(y).position(|(a, b)| !(a.is_finite() && b.is_finite())) {
        Some(index) => Err(FitError::NonFiniteSample { index }),
        None => Ok(()),
    }
}

/// `count` evenly spaced points covering `[lo, hi]` (inclusive).
pub fn linspace(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}
