//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds a `FitConfig` from flags or a job file
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, PlotArgs, SimulateArgs};
use crate::data::sample::{DischargeModel, write_sample_files};
use crate::domain::{CsvOptions, FitConfig, FitSpec, InputFiles, PlotMode};
use crate::error::AppError;
use crate::io::{curve_file, read_curve_json, read_job, write_curve_json, write_results_csv};
use crate::plot::{Figure, ascii, svg};
use crate::report::{format_largest_residuals, format_run_summary, largest_residuals};

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `dcfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Run { job } => handle_run(&job),
        Command::Plot(args) => handle_plot(&args),
        Command::Simulate(args) => handle_simulate(&args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let mut config = fit_config_from_args(args)?;
    pick_missing_inputs(&mut config)?;
    execute(&config)
}

fn handle_run(job: &Path) -> Result<(), AppError> {
    let base_dir = job.parent().unwrap_or(Path::new("."));
    let config = read_job(job)?.into_config(base_dir)?;
    tracing::info!(job = %job.display(), analysis = config.analysis.display_name(), "running job");
    execute(&config)
}

/// Run the pipeline and emit everything `config` asks for.
pub fn execute(config: &FitConfig) -> Result<(), AppError> {
    let run = pipeline::run_fit(config)?;

    let validation = run
        .data
        .overlay
        .as_ref()
        .zip(run.validation.as_ref().map(|v| &v.stats));
    println!(
        "{}",
        format_run_summary(config, &run.data.training, validation, &run.fit)
    );
    if config.top_n > 0 {
        println!(
            "{}",
            format_largest_residuals(&largest_residuals(&run.residuals, config.top_n))
        );
    }

    write_outputs(config, &run)?;

    let figure = Figure::from_fit(
        config.analysis,
        &run.data.training,
        run.data.overlay.as_ref(),
        &run.fit,
    );
    if let Some(path) = &config.save_plot {
        svg::save(&figure, path, svg::DEFAULT_SIZE)?;
    }
    match config.plot {
        PlotMode::Ascii => {
            println!("{}", ascii::render(&figure, config.plot_width, config.plot_height));
            print!("{}", ascii::legend(&figure));
        }
        PlotMode::Tui => crate::tui::show(config, run)?,
        PlotMode::None => {}
    }
    Ok(())
}

fn write_outputs(config: &FitConfig, run: &RunOutput) -> Result<(), AppError> {
    if let Some(path) = &config.export_results {
        let validation = run.validation.as_ref().map_or(&[][..], |v| v.residuals.as_slice());
        write_results_csv(path, &run.residuals, validation)?;
    }
    if let Some(path) = &config.export_curve {
        let curve = curve_file(&run.fit, config.analysis, run.data.training.x_range());
        write_curve_json(path, &curve)?;
    }
    if config.debug_bundle {
        let path = crate::debug::write_debug_bundle(config, run)?;
        println!("Debug bundle: {}", path.display());
    }
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let curve = read_curve_json(&args.curve)?;
    let figure = Figure::from_curve_file(&curve);

    if let Some(path) = &args.save_plot {
        svg::save(&figure, path, svg::DEFAULT_SIZE)?;
    }
    match args.plot {
        PlotMode::Ascii => {
            println!("{}", ascii::render(&figure, args.width, args.height));
            print!("{}", ascii::legend(&figure));
        }
        PlotMode::Tui => crate::tui::show_figure(figure)?,
        PlotMode::None => {}
    }
    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let model = DischargeModel {
        capacity_ah: args.capacity,
        internal_resistance: args.resistance,
        rate_a: args.rate,
        samples: args.samples,
        noise_v: args.noise,
        seed: args.seed,
    };
    let files = write_sample_files(&model, &args.out_dir)?;
    println!("Wrote {} rows:", files.rows);
    println!("  {}", files.charge.display());
    println!("  {}", files.energy.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let mut config = FitConfig::new(args.analysis);
    config.inputs = InputFiles {
        charge: args.charge.clone(),
        energy: args.energy.clone(),
    };
    config.validation = InputFiles {
        charge: args.validation_charge.clone(),
        energy: args.validation_energy.clone(),
    };
    config.fit = FitSpec::from_overrides(args.analysis, args.degree, args.smoothing)?;
    config.csv = CsvOptions {
        delimiter: CsvOptions::parse_delimiter(&args.delimiter)?,
        has_header: args.header,
    };
    config.voltage_column = args.voltage_column;
    config.value_column = args.value_column;
    config.sort_by_x = args.sort;

    config.top_n = args.top;
    config.plot = args.plot;
    config.plot_width = args.width;
    config.plot_height = args.height;
    config.save_plot = args.save_plot.clone();
    config.export_results = args.export.clone();
    config.export_curve = args.export_curve.clone();
    config.debug_bundle = args.debug_bundle;
    Ok(config)
}

/// Prompt for any training file the analysis needs but the flags left out.
fn pick_missing_inputs(config: &mut FitConfig) -> Result<(), AppError> {
    if config.analysis.needs_charge() && config.inputs.charge.is_none() {
        config.inputs.charge = Some(crate::cli::picker::prompt_for_csv_path("charge")?);
    }
    if config.analysis.needs_energy() && config.inputs.energy.is_none() {
        config.inputs.energy = Some(crate::cli::picker::prompt_for_csv_path("energy")?);
    }
    Ok(())
}
