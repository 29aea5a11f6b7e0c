//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ParseError};
use crate::models::{BSpline, Polynomial};

/// Paired samples `(x_i, y_i)`.
///
/// Invariant: both columns have the same, non-zero length and every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SampleSeries {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, ParseError> {
        if x.len() != y.len() {
            return Err(ParseError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.is_empty() {
            return Err(ParseError::EmptySeries);
        }
        if let Some(index) = x
            .iter()
            .zip(&y)
            .position(|(a, b)| !a.is_finite() || !b.is_finite())
        {
            return Err(ParseError::NonFinite { index });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn x_range(&self) -> (f64, f64) {
        min_max(&self.x)
    }

    pub fn y_range(&self) -> (f64, f64) {
        min_max(&self.y)
    }

    /// Same x column with a new dependent column of equal length.
    ///
    /// Callers keep the finiteness invariant.
    pub(crate) fn with_y(&self, y: Vec<f64>) -> Self {
        debug_assert_eq!(y.len(), self.x.len());
        Self {
            x: self.x.clone(),
            y,
        }
    }

    /// Copy of the series with samples reordered by ascending x.
    ///
    /// The sort is stable, so equal x values keep their input order.
    pub fn sorted_by_x(&self) -> Self {
        let mut pairs: Vec<(f64, f64)> = self.points().collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = pairs.into_iter().unzip();
        Self { x, y }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Which discharge relationship to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Analysis {
    /// Voltage → consumed charge (charge file only).
    VoltCharge,
    /// Voltage → consumed energy (energy file only).
    VoltEnergy,
    /// Consumed charge → consumed energy (charge and energy files, paired by row).
    ChargeEnergy,
}

impl Analysis {
    /// Short label used in report headers.
    pub fn display_name(self) -> &'static str {
        match self {
            Analysis::VoltCharge => "V-to-Ah",
            Analysis::VoltEnergy => "V-to-Wh",
            Analysis::ChargeEnergy => "Ah-to-Wh",
        }
    }

    pub fn x_label(self) -> &'static str {
        match self {
            Analysis::VoltCharge | Analysis::VoltEnergy => "voltage (V)",
            Analysis::ChargeEnergy => "charge consumed (Ah)",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            Analysis::VoltCharge => "charge consumed (Ah)",
            Analysis::VoltEnergy | Analysis::ChargeEnergy => "energy consumed (Wh)",
        }
    }

    pub fn needs_charge(self) -> bool {
        matches!(self, Analysis::VoltCharge | Analysis::ChargeEnergy)
    }

    pub fn needs_energy(self) -> bool {
        matches!(self, Analysis::VoltEnergy | Analysis::ChargeEnergy)
    }

    /// Fit used when neither a degree nor a smoothing factor is configured.
    pub fn default_fit(self) -> FitSpec {
        match self {
            Analysis::VoltCharge => FitSpec::Spline { smoothing: 0.002 },
            Analysis::VoltEnergy => FitSpec::Spline { smoothing: 0.01 },
            Analysis::ChargeEnergy => FitSpec::Polynomial { degree: 2 },
        }
    }
}

/// Fit strategy plus its single tuning parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitSpec {
    /// Least-squares polynomial of fixed degree.
    Polynomial { degree: usize },
    /// Cubic smoothing spline; `smoothing = 0` interpolates.
    Spline { smoothing: f64 },
}

impl FitSpec {
    /// Resolve user overrides against the analysis default.
    ///
    /// A degree selects a polynomial, a smoothing factor selects a spline.
    /// Setting both is rejected.
    pub fn from_overrides(
        analysis: Analysis,
        degree: Option<usize>,
        smoothing: Option<f64>,
    ) -> Result<FitSpec, AppError> {
        match (degree, smoothing) {
            (Some(_), Some(_)) => Err(AppError::Config(
                "set either a polynomial degree or a spline smoothing factor, not both".to_string(),
            )),
            (Some(degree), None) => Ok(FitSpec::Polynomial { degree }),
            (None, Some(smoothing)) => Ok(FitSpec::Spline { smoothing }),
            (None, None) => Ok(analysis.default_fit()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FitSpec::Polynomial { degree } => format!("polynomial, degree {degree}"),
            FitSpec::Spline { smoothing } => format!("cubic spline, s={smoothing}"),
        }
    }
}

/// Fitted curve parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CurveModel {
    Polynomial(Polynomial),
    Spline(BSpline),
}

impl CurveModel {
    /// Evaluate the curve at `x`. Values outside the training range are extrapolated.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            CurveModel::Polynomial(p) => p.evaluate(x),
            CurveModel::Spline(s) => s.evaluate(x),
        }
    }
}

/// Residual statistics on the training samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub max_abs_residual: f64,
    pub n: usize,
}

impl FitQuality {
    /// Compute statistics for `model` against the samples `(x, y)`.
    pub fn measure(model: &CurveModel, x: &[f64], y: &[f64]) -> Self {
        let mut sse = 0.0;
        let mut max_abs_residual = 0.0_f64;
        for (&xi, &yi) in x.iter().zip(y) {
            let r = yi - model.evaluate(xi);
            sse += r * r;
            max_abs_residual = max_abs_residual.max(r.abs());
        }
        let n = x.len();
        let rmse = if n > 0 { (sse / n as f64).sqrt() } else { 0.0 };
        Self {
            sse,
            rmse,
            max_abs_residual,
            n,
        }
    }
}

/// Strategy-specific solver diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitDiagnostics {
    Polynomial {
        /// Numerical rank of the scaled Vandermonde matrix.
        rank: usize,
        /// Singular values of the scaled Vandermonde matrix (descending).
        singular_values: Vec<f64>,
        /// Relative cutoff below which singular values are treated as zero.
        rcond: f64,
    },
    Spline {
        smoothing: f64,
        /// Weighted residual sum of squares reached by the spline.
        fp: f64,
        /// Smoothing parameter of the penalized solve (`None` when not needed).
        smoothing_parameter: Option<f64>,
        interior_knots: usize,
    },
}

/// Fit output for a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub spec: FitSpec,
    pub model: CurveModel,
    pub quality: FitQuality,
    pub diagnostics: FitDiagnostics,
}

impl FitResult {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.model.evaluate(x)
    }
}

/// Observed vs fitted value for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResidual {
    pub index: usize,
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Where to render the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotMode {
    /// Text plot on stdout.
    Ascii,
    /// Interactive terminal viewer.
    Tui,
    /// No plot.
    None,
}

/// Charge/energy measurement files for one current rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFiles {
    pub charge: Option<PathBuf>,
    pub energy: Option<PathBuf>,
}

impl InputFiles {
    pub fn is_empty(&self) -> bool {
        self.charge.is_none() && self.energy.is_none()
    }
}

/// Tabular input conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl CsvOptions {
    /// Parse a delimiter given as a single character or as `tab`.
    pub fn parse_delimiter(text: &str) -> Result<u8, AppError> {
        match text {
            "tab" | "\\t" | "\t" => Ok(b'\t'),
            _ => match text.as_bytes() {
                [b] if b.is_ascii() => Ok(*b),
                _ => Err(AppError::Config(format!(
                    "delimiter must be a single ASCII character or 'tab', got '{text}'"
                ))),
            },
        }
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags or a TOML job file (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub analysis: Analysis,
    pub inputs: InputFiles,
    /// Independent measurements plotted (and scored) against the fit, never fitted.
    pub validation: InputFiles,
    pub fit: FitSpec,
    pub csv: CsvOptions,
    pub voltage_column: usize,
    pub value_column: usize,
    /// Sort samples by x before fitting.
    pub sort_by_x: bool,

    pub top_n: usize,
    pub plot: PlotMode,
    pub plot_width: usize,
    pub plot_height: usize,
    pub save_plot: Option<PathBuf>,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    pub debug_bundle: bool,
}

impl FitConfig {
    /// Defaults for `analysis` with no input files set.
    pub fn new(analysis: Analysis) -> Self {
        Self {
            analysis,
            inputs: InputFiles::default(),
            validation: InputFiles::default(),
            fit: analysis.default_fit(),
            csv: CsvOptions::default(),
            voltage_column: 0,
            value_column: 1,
            sort_by_x: false,
            top_n: 10,
            plot: PlotMode::Ascii,
            plot_width: 100,
            plot_height: 25,
            save_plot: None,
            export_results: None,
            export_curve: None,
            debug_bundle: false,
        }
    }
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub analysis: Analysis,
    pub x_label: String,
    pub y_label: String,
    pub fit: FitResult,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
