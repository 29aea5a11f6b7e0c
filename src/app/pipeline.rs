//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> normalize -> fit -> residuals -> validation scores
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use crate::data::{consumed, normalize};
use crate::domain::{Analysis, FitConfig, FitResult, InputFiles, SampleResidual, SampleSeries};
use crate::error::{AppError, ParseError};
use crate::fit::fit_curve;
use crate::io::{CsvLoader, SampleLoader, Table};
use crate::report::{ValidationStats, compute_residuals, validation_stats};

/// Samples ready for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisData {
    pub training: SampleSeries,
    /// Validation overlay: plotted and scored, never fitted.
    pub overlay: Option<SampleSeries>,
}

#[derive(Debug, Clone)]
pub struct ValidationRun {
    pub residuals: Vec<SampleResidual>,
    pub stats: ValidationStats,
}

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: AnalysisData,
    pub fit: FitResult,
    pub residuals: Vec<SampleResidual>,
    pub validation: Option<ValidationRun>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let data = load_inputs(config)?;
    fit_loaded(data, config)
}

/// Load, pair and normalize the training (and optional overlay) samples.
pub fn load_inputs(config: &FitConfig) -> Result<AnalysisData, AppError> {
    let loader = CsvLoader::new(config.csv);

    let training = derive_series(&loader, config, &config.inputs, "input")?;
    tracing::info!(
        analysis = config.analysis.display_name(),
        samples = training.len(),
        "loaded training samples"
    );

    let overlay = if config.validation.is_empty() {
        None
    } else {
        let overlay = derive_series(&loader, config, &config.validation, "validation")?;
        tracing::info!(samples = overlay.len(), "loaded validation samples");
        Some(overlay)
    };

    Ok(AnalysisData { training, overlay })
}

/// Fit the training series and score the overlay against the fit.
///
/// The TUI calls this directly to refit without reloading files.
pub fn fit_loaded(data: AnalysisData, config: &FitConfig) -> Result<RunOutput, AppError> {
    let fit = fit_curve(&data.training, config.fit)?;
    let residuals = compute_residuals(&data.training, &fit);

    let validation = data.overlay.as_ref().map(|overlay| {
        let residuals = compute_residuals(overlay, &fit);
        let stats = validation_stats(&residuals, data.training.x_range());
        if stats.extrapolated > 0 {
            tracing::warn!(
                extrapolated = stats.extrapolated,
                total = stats.n,
                "validation samples lie outside the training range; the curve is extrapolated there"
            );
        }
        ValidationRun { residuals, stats }
    });

    Ok(RunOutput {
        data,
        fit,
        residuals,
        validation,
    })
}

/// Build the analysis series from one set of charge/energy files.
fn derive_series(
    loader: &impl SampleLoader,
    config: &FitConfig,
    files: &InputFiles,
    role: &str,
) -> Result<SampleSeries, AppError> {
    let (vc, qc) = (config.voltage_column, config.value_column);

    let series = match config.analysis {
        Analysis::VoltCharge => {
            let table = load(loader, files.charge.as_deref(), "charge", role)?;
            normalize(&table.series(vc, qc)?)
        }
        Analysis::VoltEnergy => {
            let table = load(loader, files.energy.as_deref(), "energy", role)?;
            normalize(&table.series(vc, qc)?)
        }
        Analysis::ChargeEnergy => {
            let charge = load(loader, files.charge.as_deref(), "charge", role)?;
            let energy = load(loader, files.energy.as_deref(), "energy", role)?;
            let x = consumed(charge.column(qc)?);
            let y = consumed(energy.column(qc)?);
            if x.len() != y.len() {
                return Err(ParseError::LengthMismatch {
                    x_len: x.len(),
                    y_len: y.len(),
                }
                .into());
            }
            SampleSeries::new(x, y)?
        }
    };

    Ok(if config.sort_by_x {
        series.sorted_by_x()
    } else {
        series
    })
}

fn load(loader: &impl SampleLoader, path: Option<&Path>, kind: &str, role: &str) -> Result<Table, AppError> {
    let path = path.ok_or_else(|| AppError::Config(format!("missing {role} {kind} file")))?;
    let table = loader.load(path)?;
    tracing::debug!(path = %path.display(), rows = table.n_rows(), kind, role, "read file");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitSpec;

    fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn volt_charge_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let charge = write(dir.path(), "c.csv", "3.0,0.0\n3.5,1.0\n4.0,2.0\n4.2,2.5\n");
        let mut config = FitConfig::new(Analysis::VoltCharge);
        config.inputs.charge = Some(charge);

        let data = load_inputs(&config).unwrap();
        assert_eq!(data.training.x(), &[3.0, 3.5, 4.0, 4.2]);
        assert_eq!(data.training.y(), &[2.5, 1.5, 0.5, 0.0]);
        assert!(data.overlay.is_none());
    }

    #[test]
    fn charge_energy_pairs_rows() {
        let dir = tempfile::tempdir().unwrap();
        let charge = write(dir.path(), "c.csv", "3.0,0.0\n3.5,1.0\n4.0,2.0\n");
        let energy = write(dir.path(), "e.csv", "3.0,0.0\n3.5,3.4\n4.0,7.0\n");
        let mut config = FitConfig::new(Analysis::ChargeEnergy);
        config.inputs = InputFiles {
            charge: Some(charge),
            energy: Some(energy),
        };
        let run = run_fit(&config).unwrap();
        assert_eq!(run.data.training.x(), &[2.0, 1.0, 0.0]);
        let expected = [7.0, 3.6, 0.0];
        for (got, want) in run.data.training.y().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
        assert_eq!(run.fit.spec, FitSpec::Polynomial { degree: 2 });
        assert_eq!(run.residuals.len(), 3);
    }

    #[test]
    fn charge_energy_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let charge = write(dir.path(), "c.csv", "3.0,0.0\n3.5,1.0\n4.0,2.0\n");
        let energy = write(dir.path(), "e.csv", "3.0,0.0\n3.5,3.4\n");
        let mut config = FitConfig::new(Analysis::ChargeEnergy);
        config.inputs = InputFiles {
            charge: Some(charge),
            energy: Some(energy),
        };
        let err = load_inputs(&config).unwrap_err();
        assert!(matches!(err, AppError::Parse(ParseError::LengthMismatch { x_len: 3, y_len: 2 })));
    }

    #[test]
    fn missing_file_is_config_error() {
        let config = FitConfig::new(Analysis::VoltEnergy);
        assert!(matches!(load_inputs(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn overlay_is_scored_not_fitted() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "t.csv", "1,4\n2,3\n3,2\n4,1\n");
        let overlay = write(dir.path(), "v.csv", "1.5,10\n5,6\n");
        let mut config = FitConfig::new(Analysis::VoltCharge);
        config.fit = FitSpec::Polynomial { degree: 1 };
        config.inputs.charge = Some(train);
        config.validation.charge = Some(overlay);

        let run = run_fit(&config).unwrap();
        let validation = run.validation.unwrap();
        // Training consumed = x - 1 exactly; overlay consumed = [0, 4] at x = [1.5, 5].
        assert!(run.fit.quality.sse < 1e-20);
        assert_eq!(validation.stats.n, 2);
        assert_eq!(validation.stats.extrapolated, 1);
        assert!((validation.residuals[0].residual + 0.5).abs() < 1e-9);
        assert!((validation.residuals[1].residual).abs() < 1e-9);
    }

    #[test]
    fn unsorted_voltage_can_be_sorted_for_spline() {
        let dir = tempfile::tempdir().unwrap();
        let charge = write(dir.path(), "c.csv", "4.0,2.0\n3.0,0.0\n3.5,1.0\n3.8,1.6\n3.2,0.3\n");
        let mut config = FitConfig::new(Analysis::VoltCharge);
        config.inputs.charge = Some(charge);

        assert!(matches!(run_fit(&config), Err(AppError::Fit(_))));

        config.sort_by_x = true;
        let run = run_fit(&config).unwrap();
        assert_eq!(run.data.training.x(), &[3.0, 3.2, 3.5, 3.8, 4.0]);
    }
}
