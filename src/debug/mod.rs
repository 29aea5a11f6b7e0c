//! Debug bundle writer for inspecting a fit run.
//!
//! The bundle is a single markdown file with the configuration, the samples
//! used, the fit parameters and an evaluation grid.

use std::fmt::Write as _;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::{CurveModel, FitConfig, FitDiagnostics};
use crate::error::AppError;
use crate::fit::linspace;

/// Rows in the evaluation grid section.
const GRID_ROWS: usize = 41;

/// Write a bundle under `./debug`.
pub fn write_debug_bundle(config: &FitConfig, run: &RunOutput) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), config, run)
}

pub fn write_debug_bundle_in(dir: &Path, config: &FitConfig, run: &RunOutput) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::io(format!("failed to create debug dir '{}'", dir.display()), e))?;

    let now = Local::now();
    let path = dir.join(format!(
        "dcfit_debug_{}_{}.md",
        config.analysis.display_name(),
        now.format("%Y%m%d_%H%M%S%.3f")
    ));

    std::fs::write(&path, render_bundle(config, run, &now.to_rfc3339()))
        .map_err(|e| AppError::io(format!("failed to write debug bundle '{}'", path.display()), e))?;
    tracing::info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

fn render_bundle(config: &FitConfig, run: &RunOutput, generated: &str) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    let _ = write_bundle(&mut md, config, run, generated);
    md
}

fn write_bundle(md: &mut String, config: &FitConfig, run: &RunOutput, generated: &str) -> std::fmt::Result {
    let analysis = config.analysis;
    writeln!(md, "# dcfit debug bundle")?;
    writeln!(md, "- generated: {generated}")?;
    writeln!(md, "- analysis: {} ({} vs {})", analysis.display_name(), analysis.y_label(), analysis.x_label())?;
    writeln!(md, "- fit: {}", run.fit.spec.describe())?;
    writeln!(md, "- charge file: {}", fmt_path(config.inputs.charge.as_deref()))?;
    writeln!(md, "- energy file: {}", fmt_path(config.inputs.energy.as_deref()))?;
    writeln!(md, "- validation charge file: {}", fmt_path(config.validation.charge.as_deref()))?;
    writeln!(md, "- validation energy file: {}", fmt_path(config.validation.energy.as_deref()))?;
    writeln!(
        md,
        "- csv: delimiter={:?} header={} columns=({}, {}) sort={}",
        config.csv.delimiter as char,
        config.csv.has_header,
        config.voltage_column,
        config.value_column,
        config.sort_by_x
    )?;

    writeln!(md, "\n## Fit")?;
    match &run.fit.model {
        CurveModel::Polynomial(p) => {
            writeln!(md, "- y = {p}")?;
            writeln!(md, "- coefficients: {}", fmt_vec(&p.coefficients))?;
        }
        CurveModel::Spline(s) => {
            writeln!(md, "- degree: {}", s.degree)?;
            writeln!(md, "- knots: {}", fmt_vec(&s.knots))?;
            writeln!(md, "- coefficients: {}", fmt_vec(&s.coefficients))?;
        }
    }
    match &run.fit.diagnostics {
        FitDiagnostics::Polynomial { rank, singular_values, rcond } => {
            writeln!(md, "- rank: {rank}, rcond: {rcond:.3e}")?;
            writeln!(md, "- singular values: {}", fmt_vec(singular_values))?;
        }
        FitDiagnostics::Spline { smoothing, fp, smoothing_parameter, interior_knots } => {
            writeln!(
                md,
                "- s: {smoothing}, fp: {fp:.6e}, p: {}, interior knots: {interior_knots}",
                fmt_opt(*smoothing_parameter)
            )?;
        }
    }
    let q = &run.fit.quality;
    writeln!(md, "- sse: {:.6e}, rmse: {:.6e}, max|r|: {:.6e}", q.sse, q.rmse, q.max_abs_residual)?;
    if let Some(v) = &run.validation {
        writeln!(
            md,
            "- validation: n={}, rmse={:.6e}, max|r|={:.6e}, extrapolated={}",
            v.stats.n, v.stats.rmse, v.stats.max_abs_residual, v.stats.extrapolated
        )?;
    }

    writeln!(md, "\n## Training samples")?;
    writeln!(md, "| index | x | y_obs | y_fit | residual |")?;
    writeln!(md, "| - | - | - | - | - |")?;
    for r in &run.residuals {
        writeln!(md, "| {} | {:.6} | {:.6} | {:.6} | {:.3e} |", r.index, r.x, r.y_obs, r.y_fit, r.residual)?;
    }

    if let Some(v) = &run.validation {
        writeln!(md, "\n## Validation samples")?;
        writeln!(md, "| index | x | y_obs | y_fit | residual |")?;
        writeln!(md, "| - | - | - | - | - |")?;
        for r in &v.residuals {
            writeln!(md, "| {} | {:.6} | {:.6} | {:.6} | {:.3e} |", r.index, r.x, r.y_obs, r.y_fit, r.residual)?;
        }
    }

    writeln!(md, "\n## Curve grid")?;
    writeln!(md, "| x | y |")?;
    writeln!(md, "| - | - |")?;
    let (lo, hi) = run.data.training.x_range();
    for x in linspace(lo, hi, GRID_ROWS) {
        writeln!(md, "| {x:.6} | {} |", fmt_opt(Some(run.fit.evaluate(x))))?;
    }
    Ok(())
}

fn fmt_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "-".to_string(), |p| p.display().to_string())
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{AnalysisData, fit_loaded};
    use crate::domain::{Analysis, FitSpec, SampleSeries};

    #[test]
    fn bundle_contains_fit_and_grid() {
        let training = SampleSeries::new(vec![3.0, 3.4, 3.8, 4.2], vec![2.0, 1.2, 0.5, 0.0]).unwrap();
        let mut config = FitConfig::new(Analysis::VoltCharge);
        config.fit = FitSpec::Polynomial { degree: 2 };
        let run = fit_loaded(AnalysisData { training, overlay: None }, &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_debug_bundle_in(dir.path(), &config, &run).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("# dcfit debug bundle\n"));
        assert!(text.contains("- fit: polynomial, degree 2"));
        assert!(text.contains("## Curve grid"));
        assert_eq!(text.lines().filter(|l| l.starts_with("| 3.") || l.starts_with("| 4.")).count(), GRID_ROWS);
        assert!(text.contains("| 0 | 3.000000 |"));
        assert!(!text.contains("## Validation samples"));
    }
}
