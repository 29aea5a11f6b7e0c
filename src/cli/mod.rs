//! Command-line parsing for the discharge curve fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline: flags are turned into a `FitConfig` by `crate::app`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{Analysis, PlotMode};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dcfit", version, about = "Battery discharge curve fitter")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a discharge curve, print the report and optionally plot/export.
    Fit(FitArgs),
    /// Run a fit described by a TOML job file.
    Run {
        /// Job file path.
        #[arg(value_name = "TOML")]
        job: PathBuf,
    },
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Write synthetic charge/energy files for a model cell.
    Simulate(SimulateArgs),
}

/// Options for `dcfit fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Relationship to fit.
    #[arg(value_enum)]
    pub analysis: Analysis,

    /// Charge log (voltage, remaining Ah).
    #[arg(short = 'c', long, value_name = "CSV")]
    pub charge: Option<PathBuf>,

    /// Energy log (voltage, remaining Wh).
    #[arg(short = 'e', long, value_name = "CSV")]
    pub energy: Option<PathBuf>,

    /// Charge log plotted and scored against the fit, never fitted.
    #[arg(long, value_name = "CSV")]
    pub validation_charge: Option<PathBuf>,

    /// Energy log plotted and scored against the fit, never fitted.
    #[arg(long, value_name = "CSV")]
    pub validation_energy: Option<PathBuf>,

    /// Fit a least-squares polynomial of this degree.
    #[arg(short = 'd', long, conflicts_with = "smoothing")]
    pub degree: Option<usize>,

    /// Fit a cubic smoothing spline with this residual budget (0 interpolates).
    #[arg(short = 's', long)]
    pub smoothing: Option<f64>,

    /// Sort samples by x before fitting.
    #[arg(long)]
    pub sort: bool,

    /// Field delimiter: a single character or `tab`.
    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// Skip the first row of every input file.
    #[arg(long)]
    pub header: bool,

    /// Zero-based voltage column.
    #[arg(long, default_value_t = 0)]
    pub voltage_column: usize,

    /// Zero-based remaining-charge/energy column.
    #[arg(long, default_value_t = 1)]
    pub value_column: usize,

    /// Where to draw the figure.
    #[arg(long, value_enum, default_value_t = PlotMode::Ascii)]
    pub plot: PlotMode,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Show the N samples with the largest residuals.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Also write the figure to an SVG file.
    #[arg(long, value_name = "SVG")]
    pub save_plot: Option<PathBuf>,

    /// Export per-sample results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the curve (fit + evaluated grid) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,

    /// Write a markdown debug bundle under `./debug`.
    #[arg(long)]
    pub debug_bundle: bool,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `dcfit fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Where to draw the figure.
    #[arg(long, value_enum, default_value_t = PlotMode::Ascii)]
    pub plot: PlotMode,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write the figure to an SVG file.
    #[arg(long, value_name = "SVG")]
    pub save_plot: Option<PathBuf>,
}

/// Options for `dcfit simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Output directory.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Discharge current (A).
    #[arg(long, default_value_t = 1.0)]
    pub rate: f64,

    /// Nominal capacity (Ah).
    #[arg(long, default_value_t = 2.5)]
    pub capacity: f64,

    /// Internal resistance (Ω).
    #[arg(long, default_value_t = 0.05)]
    pub resistance: f64,

    /// Number of logged rows.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub samples: usize,

    /// Voltage noise standard deviation (V).
    #[arg(long, default_value_t = 0.002)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_flags_parse() {
        let cli = Cli::parse_from([
            "dcfit", "-vv", "fit", "volt-charge", "-c", "charge-0.5a.csv", "--validation-charge",
            "charge-1.0a.csv", "-s", "0.002", "--plot", "none",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.analysis, Analysis::VoltCharge);
        assert_eq!(args.smoothing, Some(0.002));
        assert_eq!(args.plot, PlotMode::None);
        assert_eq!(args.validation_charge, Some(PathBuf::from("charge-1.0a.csv")));
    }

    #[test]
    fn degree_and_smoothing_conflict() {
        let res = Cli::try_parse_from(["dcfit", "fit", "charge-energy", "-d", "2", "-s", "0.1"]);
        assert!(res.is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
