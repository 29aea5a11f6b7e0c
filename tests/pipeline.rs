//! End-to-end runs over simulated discharge logs.
//!
//! Each test writes charge/energy files with the simulator into a temporary
//! directory and drives the library pipeline the way `dcfit fit` and
//! `dcfit run` do.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use approx::{assert_abs_diff_eq, assert_relative_eq};
use discharge_curves::app::execute;
use discharge_curves::app::pipeline::run_fit;
use discharge_curves::data::sample::{DischargeModel, SampleFiles, write_sample_files};
use discharge_curves::domain::{Analysis, CurveModel, FitConfig, FitDiagnostics, FitSpec, PlotMode};
use discharge_curves::error::AppError;
use discharge_curves::io::{CURVE_GRID_POINTS, read_curve_json, read_job};
use discharge_curves::plot::{Figure, ascii};

fn simulate(dir: &Path, rate_a: f64) -> SampleFiles {
    let model = DischargeModel {
        rate_a,
        samples: 120,
        noise_v: 0.0,
        ..DischargeModel::default()
    };
    write_sample_files(&model, dir).unwrap()
}

fn config(analysis: Analysis, files: &SampleFiles, fit: FitSpec) -> FitConfig {
    let mut config = FitConfig::new(analysis);
    config.inputs.charge = Some(files.charge.clone());
    config.inputs.energy = Some(files.energy.clone());
    config.fit = fit;
    config.plot = PlotMode::None;
    config
}

// ============================================================================
// Analyses
// ============================================================================

#[test]
fn interpolating_spline_reproduces_training_samples() {
    let dir = tempfile::tempdir().unwrap();
    let files = simulate(dir.path(), 1.0);
    let run = run_fit(&config(Analysis::VoltCharge, &files, FitSpec::Spline { smoothing: 0.0 })).unwrap();

    assert_eq!(run.data.training.len(), files.rows);
    for r in &run.residuals {
        assert_abs_diff_eq!(r.y_fit, r.y_obs, epsilon = 1e-8);
    }
    // Consumed charge is zero at the top of charge.
    let (_, v_max) = run.data.training.x_range();
    assert_abs_diff_eq!(run.fit.evaluate(v_max), 0.0, epsilon = 1e-8);
}

#[test]
fn smoothing_spline_meets_residual_budget() {
    let dir = tempfile::tempdir().unwrap();
    let files = simulate(dir.path(), 1.0);

    for (analysis, smoothing) in [(Analysis::VoltCharge, 0.002), (Analysis::VoltEnergy, 0.01)] {
        let run = run_fit(&config(analysis, &files, analysis.default_fit())).unwrap();
        let FitDiagnostics::Spline { fp, .. } = run.fit.diagnostics else {
            panic!("expected spline diagnostics");
        };
        assert_eq!(run.fit.spec, FitSpec::Spline { smoothing });
        assert!(fp <= smoothing * 1.001, "{analysis:?}: fp={fp}");
        assert_relative_eq!(fp, run.fit.quality.sse, max_relative = 1e-9);
    }
}

#[test]
fn noisy_long_logs_meet_default_budgets_quickly() {
    let dir = tempfile::tempdir().unwrap();
    let model = DischargeModel {
        samples: 1000,
        ..DischargeModel::default()
    };
    assert!(model.noise_v > 0.0);
    let files = write_sample_files(&model, dir.path()).unwrap();

    for (analysis, smoothing) in [(Analysis::VoltCharge, 0.002), (Analysis::VoltEnergy, 0.01)] {
        let mut cfg = config(analysis, &files, analysis.default_fit());
        cfg.sort_by_x = true;

        let started = Instant::now();
        let run = run_fit(&cfg).unwrap();
        let elapsed = started.elapsed();

        let FitDiagnostics::Spline { fp, interior_knots, .. } = run.fit.diagnostics else {
            panic!("expected spline diagnostics");
        };
        assert_eq!(run.fit.spec, FitSpec::Spline { smoothing });
        assert!(fp <= smoothing * 1.001, "{analysis:?}: fp={fp}");
        assert!(interior_knots > 0, "{analysis:?}: noise should need interior knots");
        assert!(elapsed < Duration::from_secs(5), "{analysis:?}: took {elapsed:?}");
    }
}

#[test]
fn charge_energy_is_close_to_quadratic() {
    let dir = tempfile::tempdir().unwrap();
    let files = simulate(dir.path(), 1.0);
    let run = run_fit(&config(
        Analysis::ChargeEnergy,
        &files,
        FitSpec::Polynomial { degree: 2 },
    ))
    .unwrap();

    let CurveModel::Polynomial(p) = &run.fit.model else {
        panic!("expected polynomial");
    };
    assert_eq!(p.coefficients.len(), 3);
    // The slope is the mean terminal voltage, somewhere on the plateau.
    assert!(p.coefficients[1] > 3.0 && p.coefficients[1] < 4.5, "{p}");

    let (y0, y1) = run.data.training.y_range();
    assert!(run.fit.quality.rmse < 0.02 * (y1 - y0));
}

// ============================================================================
// Validation overlay
// ============================================================================

#[test]
fn overlay_is_scored_without_changing_the_fit() {
    let dir = tempfile::tempdir().unwrap();
    let train = simulate(dir.path(), 1.0);
    let overlay = simulate(dir.path(), 0.5);
    assert_ne!(train.charge, overlay.charge);

    let plain = config(Analysis::VoltCharge, &train, FitSpec::Polynomial { degree: 5 });
    let mut with_overlay = plain.clone();
    with_overlay.validation.charge = Some(overlay.charge.clone());

    let a = run_fit(&plain).unwrap();
    let b = run_fit(&with_overlay).unwrap();
    assert_eq!(a.fit.model, b.fit.model);
    assert!(a.validation.is_none());

    let v = b.validation.unwrap();
    assert_eq!(v.stats.n, overlay.rows);
    assert!(v.stats.rmse.is_finite());
    // Less IR drop at 0.5 A pushes the top of the overlay above the training range.
    assert!(v.stats.extrapolated > 0);

    let figure = Figure::from_fit(Analysis::VoltCharge, &b.data.training, b.data.overlay.as_ref(), &b.fit);
    let text = ascii::render(&figure, 80, 20);
    let body: String = text.lines().skip(1).collect();
    assert!(body.contains('o') && body.contains('x'));
    assert_eq!(ascii::legend(&figure).split(" | ").next(), Some("o training  x validation  - fit"));
}

// ============================================================================
// Job files and outputs
// ============================================================================

#[test]
fn job_file_run_writes_requested_outputs() {
    let dir = tempfile::tempdir().unwrap();
    simulate(&dir.path().join("data"), 1.0);
    std::fs::create_dir_all(dir.path().join("out")).unwrap();

    let job_path = dir.path().join("job.toml");
    std::fs::write(
        &job_path,
        r#"
analysis = "volt-energy"

[inputs]
energy = "data/energy-1.0a.csv"

[fit]
smoothing = 0.02

[output]
plot = "none"
top = 3
export = "out/results.csv"
export_curve = "out/curve.json"
save_plot = "out/curve.svg"
"#,
    )
    .unwrap();

    let config = read_job(&job_path).unwrap().into_config(dir.path()).unwrap();
    assert_eq!(config.fit, FitSpec::Spline { smoothing: 0.02 });
    execute(&config).unwrap();

    let out = |name: &str| -> PathBuf { dir.path().join("out").join(name) };
    let results = std::fs::read_to_string(out("results.csv")).unwrap();
    assert_eq!(results.lines().next(), Some("set,index,x,y_obs,y_fit,residual"));
    assert_eq!(results.lines().count(), 1 + 120);

    let curve = read_curve_json(&out("curve.json")).unwrap();
    assert_eq!(curve.analysis, Analysis::VoltEnergy);
    assert_eq!(curve.grid.x.len(), CURVE_GRID_POINTS);
    let figure = Figure::from_curve_file(&curve);
    assert_eq!(figure.curve.as_ref().map(Vec::len), Some(CURVE_GRID_POINTS));

    let svg = std::fs::read_to_string(out("curve.svg")).unwrap();
    assert!(svg.starts_with("<svg"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn failures_map_to_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let files = simulate(dir.path(), 1.0);

    let too_high = config(Analysis::VoltCharge, &files, FitSpec::Polynomial { degree: 500 });
    let err = run_fit(&too_high).unwrap_err();
    assert!(matches!(err, AppError::Fit(_)));
    assert_eq!(err.exit_code(), 3);

    let ragged = dir.path().join("ragged.csv");
    std::fs::write(&ragged, "4.0,1.0\n3.9,0.9,0.1\n").unwrap();
    let mut bad = config(Analysis::VoltCharge, &files, FitSpec::Polynomial { degree: 1 });
    bad.inputs.charge = Some(ragged);
    let err = run_fit(&bad).unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
    assert_eq!(err.exit_code(), 2);
}
