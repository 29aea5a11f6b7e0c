//! Renderer-independent figure description.
//!
//! A `Figure` is what every renderer draws: labelled scatter series (training
//! samples, validation overlay) and an optional fitted-curve polyline.
//!
//! Renderers:
//! - `ascii`: fixed-grid text plot for stdout
//! - `svg`: vector file through plotters
//! - `crate::tui`: interactive terminal viewer

pub mod ascii;
pub mod svg;

use crate::domain::{Analysis, CurveFile, FitResult, SampleSeries};
use crate::fit::linspace;

/// Points used to draw a fitted curve.
pub const CURVE_SAMPLES: usize = 201;

/// Which part of the run a scatter series shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesRole {
    /// Samples the curve was fitted to.
    Training,
    /// Independent samples plotted against the fit.
    Overlay,
}

impl SeriesRole {
    pub fn marker(self) -> char {
        match self {
            SeriesRole::Training => 'o',
            SeriesRole::Overlay => 'x',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: String,
    pub role: SeriesRole,
    pub points: Vec<(f64, f64)>,
}

impl ScatterSeries {
    pub fn from_series(label: impl Into<String>, role: SeriesRole, series: &SampleSeries) -> Self {
        Self {
            label: label.into(),
            role,
            points: series.points().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub scatter: Vec<ScatterSeries>,
    pub curve: Option<Vec<(f64, f64)>>,
}

impl Figure {
    /// Training points, optional overlay and the fitted curve.
    ///
    /// The curve spans the union of both x ranges, so overlay points outside the
    /// training range show the extrapolated curve.
    pub fn from_fit(
        analysis: Analysis,
        training: &SampleSeries,
        overlay: Option<&SampleSeries>,
        fit: &FitResult,
    ) -> Self {
        let mut scatter = vec![ScatterSeries::from_series("training", SeriesRole::Training, training)];
        if let Some(overlay) = overlay {
            scatter.push(ScatterSeries::from_series("validation", SeriesRole::Overlay, overlay));
        }

        let (mut lo, mut hi) = training.x_range();
        if let Some(overlay) = overlay {
            let (a, b) = overlay.x_range();
            lo = lo.min(a);
            hi = hi.max(b);
        }
        let curve = linspace(lo, hi, CURVE_SAMPLES)
            .into_iter()
            .map(|x| (x, fit.evaluate(x)))
            .collect();

        Self {
            title: format!("{} ({})", analysis.display_name(), fit.spec.describe()),
            x_label: analysis.x_label().to_string(),
            y_label: analysis.y_label().to_string(),
            scatter,
            curve: Some(curve),
        }
    }

    /// Curve-only figure from a saved curve file.
    pub fn from_curve_file(curve: &CurveFile) -> Self {
        Self {
            title: format!("{} ({})", curve.analysis.display_name(), curve.fit.spec.describe()),
            x_label: curve.x_label.clone(),
            y_label: curve.y_label.clone(),
            scatter: Vec::new(),
            curve: Some(
                curve
                    .grid
                    .x
                    .iter()
                    .copied()
                    .zip(curve.grid.y.iter().copied())
                    .collect(),
            ),
        }
    }

    /// `"<marker> <label>"` per scatter series, then `"- fit"` when a curve is drawn.
    pub fn legend_entries(&self) -> Vec<String> {
        let mut parts: Vec<String> = self
            .scatter
            .iter()
            .map(|s| format!("{} {}", s.role.marker(), s.label))
            .collect();
        if self.curve.is_some() {
            parts.push("- fit".to_string());
        }
        parts
    }

    fn all_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.scatter
            .iter()
            .flat_map(|s| s.points.iter().copied())
            .chain(self.curve.iter().flatten().copied())
    }

    /// `(min, max)` of x over every element; `None` when empty or degenerate.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        finite_range(self.all_points().map(|p| p.0))
    }

    pub fn y_range(&self) -> Option<(f64, f64)> {
        finite_range(self.all_points().map(|p| p.1))
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (lo.is_finite() && hi.is_finite() && hi > lo).then_some((lo, hi))
}

/// Widen `[min, max]` by `frac` of its span on both sides.
pub fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
