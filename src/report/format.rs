//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{CurveModel, FitConfig, FitDiagnostics, FitResult, SampleResidual, SampleSeries};
use crate::report::ValidationStats;

/// Fit parameters and residual statistics.
pub fn format_fit_report(fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Fit: {}\n", fit.spec.describe()));

    match &fit.model {
        CurveModel::Polynomial(p) => {
            out.push_str(&format!("  y = {p}\n"));
            out.push_str(&format!(
                "  coefficients (lowest power first): {}\n",
                fmt_vec(&p.coefficients)
            ));
        }
        CurveModel::Spline(s) => {
            out.push_str(&format!("  degree: {}\n", s.degree));
            out.push_str(&format!("  knots (n={}): {}\n", s.knots.len(), fmt_vec(&s.knots)));
            out.push_str(&format!(
                "  coefficients (n={}): {}\n",
                s.coefficients.len(),
                fmt_vec(&s.coefficients)
            ));
        }
    }

    match &fit.diagnostics {
        FitDiagnostics::Polynomial {
            rank,
            singular_values,
            rcond,
        } => {
            out.push_str(&format!("  rank={rank} rcond={rcond:.3e}\n"));
            out.push_str(&format!("  singular values: {}\n", fmt_vec(singular_values)));
        }
        FitDiagnostics::Spline {
            smoothing,
            fp,
            smoothing_parameter,
            interior_knots,
        } => {
            let p = smoothing_parameter.map_or_else(|| "-".to_string(), |p| format!("{p:.6e}"));
            out.push_str(&format!(
                "  fp={fp:.6e} s={smoothing} p={p} interior knots={interior_knots}\n"
            ));
        }
    }

    let q = &fit.quality;
    out.push_str(&format!(
        "  SSE={:.6e} RMSE={:.6e} max|r|={:.6e} n={}\n",
        q.sse, q.rmse, q.max_abs_residual, q.n
    ));
    out
}

/// Run header (analysis, inputs, sample ranges), the fit report and validation scores.
pub fn format_run_summary(
    config: &FitConfig,
    training: &SampleSeries,
    validation: Option<(&SampleSeries, &ValidationStats)>,
    fit: &FitResult,
) -> String {
    let analysis = config.analysis;
    let mut out = String::new();

    out.push_str(&format!("=== dcfit - {} discharge curve ===\n", analysis.display_name()));
    push_files(&mut out, "Inputs", config.inputs.charge.as_deref(), config.inputs.energy.as_deref());
    if !config.validation.is_empty() {
        push_files(
            &mut out,
            "Validation",
            config.validation.charge.as_deref(),
            config.validation.energy.as_deref(),
        );
    }
    out.push_str(&format!("X: {}\nY: {}\n", analysis.x_label(), analysis.y_label()));
    out.push_str(&format!("Training: {}\n", fmt_series(training)));
    out.push('\n');

    out.push_str(&format_fit_report(fit));

    if let Some((series, stats)) = validation {
        out.push('\n');
        out.push_str(&format!("Validation: {}\n", fmt_series(series)));
        out.push_str(&format!(
            "  RMSE={:.6e} max|r|={:.6e} extrapolated={}/{}\n",
            stats.rmse, stats.max_abs_residual, stats.extrapolated, stats.n
        ));
    }
    out.push('\n');
    out
}

/// Table of the samples with the largest absolute residuals.
pub fn format_largest_residuals(rows: &[SampleResidual]) -> String {
    let mut out = String::new();
    out.push_str("Largest residuals:\n");
    out.push_str(
        format!(
            "{:>6} {:>12} {:>14} {:>14} {:>14}",
            "index", "x", "y_obs", "y_fit", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<6} {:-<12} {:-<14} {:-<14} {:-<14}\n",
        "", "", "", "", ""
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>6} {:>12.6} {:>14.6} {:>14.6} {:>14.6}\n",
            r.index, r.x, r.y_obs, r.y_fit, r.residual
        ));
    }
    out
}

fn push_files(out: &mut String, label: &str, charge: Option<&Path>, energy: Option<&Path>) {
    let mut parts = Vec::new();
    if let Some(p) = charge {
        parts.push(format!("charge={}", p.display()));
    }
    if let Some(p) = energy {
        parts.push(format!("energy={}", p.display()));
    }
    out.push_str(&format!("{label}: {}\n", parts.join(" ")));
}

fn fmt_series(series: &SampleSeries) -> String {
    let (x0, x1) = series.x_range();
    let (y0, y1) = series.y_range();
    format!(
        "n={} | x=[{x0:.4}, {x1:.4}] | y=[{y0:.4}, {y1:.4}]",
        series.len()
    )
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Analysis, FitSpec};
    use crate::fit::fit_curve;
    use crate::report::{compute_residuals, largest_residuals};

    #[test]
    fn polynomial_report_lists_coefficients_low_to_high() {
        let s = SampleSeries::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let fit = fit_curve(&s, FitSpec::Polynomial { degree: 1 }).unwrap();
        let text = format_fit_report(&fit);
        assert!(text.starts_with("Fit: polynomial, degree 1\n"));
        assert!(text.contains("y = 1.000000 + 2.000000·x"), "{text}");
        assert!(text.contains("coefficients (lowest power first): [1.000000, 2.000000]"));
        assert!(text.contains("rank=2"));
    }

    #[test]
    fn spline_report_lists_knots_and_lengths() {
        let x: Vec<f64> = (0..6).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let s = SampleSeries::new(x, y).unwrap();
        let fit = fit_curve(&s, FitSpec::Spline { smoothing: 0.0 }).unwrap();
        let text = format_fit_report(&fit);
        assert!(text.contains("knots (n=10)"), "{text}");
        assert!(text.contains("coefficients (n=6)"));
        assert!(text.contains("p=-"));
    }

    #[test]
    fn summary_includes_validation_block() {
        let train = SampleSeries::new(vec![3.0, 3.5, 4.0], vec![1.0, 0.5, 0.0]).unwrap();
        let overlay = SampleSeries::new(vec![3.2, 3.7], vec![0.8, 0.3]).unwrap();
        let fit = fit_curve(&train, FitSpec::Polynomial { degree: 1 }).unwrap();
        let stats = ValidationStats {
            n: 2,
            rmse: 0.01,
            max_abs_residual: 0.02,
            extrapolated: 0,
        };
        let mut config = FitConfig::new(Analysis::VoltCharge);
        config.inputs.charge = Some("charge-0.5a.csv".into());
        let text = format_run_summary(&config, &train, Some((&overlay, &stats)), &fit);
        assert!(text.starts_with("=== dcfit - V-to-Ah discharge curve ===\n"));
        assert!(text.contains("Inputs: charge=charge-0.5a.csv"));
        assert!(text.contains("Training: n=3"));
        assert!(text.contains("extrapolated=0/2"));
    }

    #[test]
    fn residual_table_has_one_row_per_sample() {
        let s = SampleSeries::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.5, 2.0]).unwrap();
        let fit = fit_curve(&s, FitSpec::Polynomial { degree: 0 }).unwrap();
        let rows = largest_residuals(&compute_residuals(&s, &fit), 2);
        let text = format_largest_residuals(&rows);
        assert_eq!(text.lines().count(), 3 + 2);
    }
}
