//! Reporting utilities: residuals, validation scores and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, SampleResidual, SampleSeries};

/// How well the fit predicts a series it was not trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationStats {
    pub n: usize,
    pub rmse: f64,
    pub max_abs_residual: f64,
    /// Samples outside the training x range (evaluated by extrapolation).
    pub extrapolated: usize,
}

/// Fitted value and residual for each sample of `series`.
pub fn compute_residuals(series: &SampleSeries, fit: &FitResult) -> Vec<SampleResidual> {
    series
        .points()
        .enumerate()
        .map(|(index, (x, y_obs))| {
            let y_fit = fit.evaluate(x);
            SampleResidual {
                index,
                x,
                y_obs,
                y_fit,
                residual: y_obs - y_fit,
            }
        })
        .collect()
}

/// The `top_n` samples with the largest absolute residual, largest first.
///
/// Ties keep sample order.
pub fn largest_residuals(residuals: &[SampleResidual], top_n: usize) -> Vec<SampleResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.abs().total_cmp(&a.residual.abs()));
    sorted.truncate(top_n);
    sorted
}

/// Score validation residuals against a fit trained on `training_range`.
pub fn validation_stats(residuals: &[SampleResidual], training_range: (f64, f64)) -> ValidationStats {
    let n = residuals.len();
    let sse: f64 = residuals.iter().map(|r| r.residual * r.residual).sum();
    let (lo, hi) = training_range;
    ValidationStats {
        n,
        rmse: if n > 0 { (sse / n as f64).sqrt() } else { 0.0 },
        max_abs_residual: residuals
            .iter()
            .fold(0.0_f64, |m, r| m.max(r.residual.abs())),
        extrapolated: residuals.iter().filter(|r| r.x < lo || r.x > hi).count(),
    }
}
