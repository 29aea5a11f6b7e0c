//! Remaining → consumed conversion.
//!
//! Instruments log the quantity still left in the cell; the fits work on what
//! has been drawn so far, `max(Y) − Y`.

use crate::domain::SampleSeries;

/// `max(values) − v` for every `v`. Empty input gives an empty vector.
pub fn consumed(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values.iter().map(|&v| max - v).collect()
}

/// Series with the dependent column replaced by its consumed form.
pub fn normalize(series: &SampleSeries) -> SampleSeries {
    // Differences of finite values stay finite.
    series.with_y(consumed(series.y()))
}
