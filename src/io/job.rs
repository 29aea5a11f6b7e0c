//! TOML job files.
//!
//! A job file captures a complete `fit` invocation so it can be re-run:
//!
//! ```toml
//! analysis = "volt-charge"
//!
//! [inputs]
//! charge = "data/charge-0.5a.csv"
//!
//! [validation]
//! charge = "data/charge-1.0a.csv"
//!
//! [fit]
//! smoothing = 0.002
//! sort = true
//!
//! [output]
//! plot = "none"
//! export_curve = "out/volt-charge.json"
//! ```
//!
//! Relative paths are resolved against the job file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{Analysis, CsvOptions, FitConfig, FitSpec, InputFiles, PlotMode};
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub analysis: Analysis,
    #[serde(default)]
    pub inputs: InputFiles,
    #[serde(default)]
    pub validation: InputFiles,
    #[serde(default)]
    pub fit: JobFit,
    #[serde(default)]
    pub csv: JobCsv,
    #[serde(default)]
    pub output: JobOutput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFit {
    pub degree: Option<usize>,
    pub smoothing: Option<f64>,
    #[serde(default)]
    pub sort: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobCsv {
    pub delimiter: Option<String>,
    #[serde(default)]
    pub header: bool,
    pub voltage_column: Option<usize>,
    pub value_column: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobOutput {
    pub plot: Option<PlotMode>,
    pub plot_width: Option<usize>,
    pub plot_height: Option<usize>,
    pub top: Option<usize>,
    pub save_plot: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    #[serde(default)]
    pub debug_bundle: bool,
}

/// Read and parse a job file.
pub fn read_job(path: &Path) -> Result<JobFile, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("failed to read job file '{}'", path.display()), e))?;
    parse_job(&text).map_err(|e| match e {
        AppError::Config(msg) => AppError::Config(format!("'{}': {msg}", path.display())),
        other => other,
    })
}

pub fn parse_job(text: &str) -> Result<JobFile, AppError> {
    toml::from_str(text).map_err(|e| AppError::Config(format!("invalid job file: {e}")))
}

impl JobFile {
    /// Build the pipeline configuration, resolving relative paths against `base_dir`.
    pub fn into_config(self, base_dir: &Path) -> Result<FitConfig, AppError> {
        let mut config = FitConfig::new(self.analysis);
        config.fit = FitSpec::from_overrides(self.analysis, self.fit.degree, self.fit.smoothing)?;
        config.sort_by_x = self.fit.sort;

        config.inputs = resolve_files(self.inputs, base_dir);
        config.validation = resolve_files(self.validation, base_dir);

        config.csv = CsvOptions {
            delimiter: match self.csv.delimiter.as_deref() {
                Some(d) => CsvOptions::parse_delimiter(d)?,
                None => CsvOptions::default().delimiter,
            },
            has_header: self.csv.header,
        };
        if let Some(c) = self.csv.voltage_column {
            config.voltage_column = c;
        }
        if let Some(c) = self.csv.value_column {
            config.value_column = c;
        }

        let out = self.output;
        if let Some(plot) = out.plot {
            config.plot = plot;
        }
        if let Some(w) = out.plot_width {
            config.plot_width = w;
        }
        if let Some(h) = out.plot_height {
            config.plot_height = h;
        }
        if let Some(top) = out.top {
            config.top_n = top;
        }
        config.save_plot = out.save_plot.map(|p| resolve(p, base_dir));
        config.export_results = out.export.map(|p| resolve(p, base_dir));
        config.export_curve = out.export_curve.map(|p| resolve(p, base_dir));
        config.debug_bundle = out.debug_bundle;

        Ok(config)
    }
}

fn resolve_files(files: InputFiles, base_dir: &Path) -> InputFiles {
    InputFiles {
        charge: files.charge.map(|p| resolve(p, base_dir)),
        energy: files.energy.map(|p| resolve(p, base_dir)),
    }
}

fn resolve(path: PathBuf, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
