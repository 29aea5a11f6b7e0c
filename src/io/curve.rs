//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted curve:
//! - fit spec, model parameters, quality and diagnostics
//! - analysis and axis labels
//! - a precomputed grid over the training range for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::domain::{Analysis, CurveFile, CurveGrid, FitResult};
use crate::error::AppError;
use crate::fit::{evaluate, linspace};

/// Points in the exported evaluation grid.
pub const CURVE_GRID_POINTS: usize = 201;

/// Assemble a curve file for `fit`, trained on x values spanning `x_range`.
pub fn curve_file(fit: &FitResult, analysis: Analysis, x_range: (f64, f64)) -> CurveFile {
    let (lo, hi) = grid_bounds(x_range);
    let x = linspace(lo, hi, CURVE_GRID_POINTS);
    let y = evaluate(fit, &x);
    CurveFile {
        tool: env!("CARGO_PKG_NAME").to_string(),
        generated_at: Local::now(),
        analysis,
        x_label: analysis.x_label().to_string(),
        y_label: analysis.y_label().to_string(),
        fit: fit.clone(),
        grid: CurveGrid { x, y },
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("failed to create curve JSON '{}'", path.display()), e))?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| AppError::io(format!("failed to write curve JSON '{}'", path.display()), e);
    serde_json::to_writer_pretty(&mut out, curve).map_err(|e| io_err(e.into()))?;
    out.flush().map_err(io_err)?;
    tracing::info!(path = %path.display(), "wrote curve JSON");
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("failed to open curve JSON '{}'", path.display()), e))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::Config(format!("invalid curve JSON '{}': {e}", path.display())))
}

fn grid_bounds((lo, hi): (f64, f64)) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-12 {
        return (lo - 0.5, hi + 0.5);
    }
    (lo, hi)
}
