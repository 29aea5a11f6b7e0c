//! Synthetic constant-current discharge data.
//!
//! Produces the same two files a cycler would log for one discharge rate:
//!
//! - `charge-<rate>a.csv`: `voltage, remaining charge (Ah)`
//! - `energy-<rate>a.csv`: `voltage, remaining energy (Wh)`
//!
//! Both files share one voltage trace and are written in ascending voltage
//! order, so their rows pair up for the charge → energy analysis.

use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Capacity lost per ampere of discharge current (rate-capacity effect).
const RATE_CAPACITY_LOSS: f64 = 0.03;

/// Model cell and logging parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeModel {
    /// Nominal capacity at vanishing current (Ah).
    pub capacity_ah: f64,
    /// Ohmic resistance (Ω).
    pub internal_resistance: f64,
    /// Discharge current (A).
    pub rate_a: f64,
    pub samples: usize,
    /// Standard deviation of the voltage measurement noise (V).
    pub noise_v: f64,
    pub seed: u64,
}

impl Default for DischargeModel {
    fn default() -> Self {
        Self {
            capacity_ah: 2.5,
            internal_resistance: 0.05,
            rate_a: 1.0,
            samples: 200,
            noise_v: 0.002,
            seed: 42,
        }
    }
}

/// One simulated log row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeRow {
    pub voltage: f64,
    pub remaining_ah: f64,
    pub remaining_wh: f64,
}

/// Paths written by `write_sample_files`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFiles {
    pub charge: PathBuf,
    pub energy: PathBuf,
    pub rows: usize,
}

/// Open-circuit voltage of the model cell at state of charge `soc ∈ [0, 1]`.
///
/// A linear plateau with a knee near full charge and a steep drop near empty.
pub fn open_circuit_voltage(soc: f64) -> f64 {
    3.2 + 0.9 * soc + 0.1 * (1.0 - (-30.0 * soc).exp()) - 0.2 * (-15.0 * soc).exp()
}

/// Usable capacity at the configured current.
pub fn effective_capacity(model: &DischargeModel) -> f64 {
    model.capacity_ah * (1.0 - RATE_CAPACITY_LOSS * model.rate_a).max(0.05)
}

/// Simulate one discharge. Rows are sorted by ascending voltage.
pub fn simulate_discharge(model: &DischargeModel) -> Result<Vec<DischargeRow>, AppError> {
    validate(model)?;

    let mut rng = StdRng::seed_from_u64(model.seed);
    let noise = Normal::new(0.0, model.noise_v)
        .map_err(|e| AppError::Config(format!("invalid voltage noise: {e}")))?;

    let capacity = effective_capacity(model);
    let drop = model.rate_a * model.internal_resistance;
    let n = model.samples;

    // Walk from empty to full; remaining energy is the integral of the
    // terminal voltage over the charge still in the cell.
    let mut rows = Vec::with_capacity(n);
    let mut energy = 0.0;
    let mut previous: Option<(f64, f64)> = None;
    for i in 0..n {
        let soc = i as f64 / (n - 1) as f64;
        let charge = capacity * soc;
        let terminal = open_circuit_voltage(soc) - drop;
        if let Some((q0, v0)) = previous {
            energy += 0.5 * (terminal + v0) * (charge - q0);
        }
        previous = Some((charge, terminal));

        rows.push(DischargeRow {
            voltage: round_micro(terminal + noise.sample(&mut rng)),
            remaining_ah: charge,
            remaining_wh: energy,
        });
    }

    rows.sort_by(|a, b| a.voltage.total_cmp(&b.voltage));
    // Files hold 6 decimals; equal readings would stall a spline fit on voltage.
    rows.dedup_by(|b, a| b.voltage == a.voltage);
    tracing::debug!(
        rows = rows.len(),
        capacity_ah = capacity,
        energy_wh = energy,
        "simulated discharge"
    );
    Ok(rows)
}

fn round_micro(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// File name stem for a discharge current, e.g. `1.0a` or `0.25a`.
pub fn rate_label(rate_a: f64) -> String {
    let mut s = format!("{rate_a}");
    if !s.contains('.') {
        s.push_str(".0");
    }
    s.push('a');
    s
}

/// Simulate and write `charge-<rate>a.csv` / `energy-<rate>a.csv` into `dir`.
pub fn write_sample_files(model: &DischargeModel, dir: &Path) -> Result<SampleFiles, AppError> {
    let rows = simulate_discharge(model)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("failed to create '{}'", dir.display()), e))?;

    let label = rate_label(model.rate_a);
    let charge = dir.join(format!("charge-{label}.csv"));
    let energy = dir.join(format!("energy-{label}.csv"));

    write_column_file(&charge, &rows, |r| r.remaining_ah)?;
    write_column_file(&energy, &rows, |r| r.remaining_wh)?;
    tracing::info!(charge = %charge.display(), energy = %energy.display(), "wrote sample files");

    Ok(SampleFiles {
        charge,
        energy,
        rows: rows.len(),
    })
}

fn write_column_file(
    path: &Path,
    rows: &[DischargeRow],
    value: impl Fn(&DischargeRow) -> f64,
) -> Result<(), AppError> {
    let csv_err = |e: csv::Error| AppError::io(format!("failed to write '{}'", path.display()), e.into());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    for row in rows {
        writer
            .write_record([format!("{:.6}", row.voltage), format!("{:.6}", value(row))])
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("failed to write '{}'", path.display()), e))
}

fn validate(model: &DischargeModel) -> Result<(), AppError> {
    if model.samples < 2 {
        return Err(AppError::Config("simulation needs at least 2 samples".to_string()));
    }
    if !(model.capacity_ah.is_finite() && model.capacity_ah > 0.0) {
        return Err(AppError::Config("capacity must be > 0".to_string()));
    }
    if !(model.rate_a.is_finite() && model.rate_a > 0.0) {
        return Err(AppError::Config("discharge rate must be > 0".to_string()));
    }
    if !(model.internal_resistance.is_finite() && model.internal_resistance >= 0.0) {
        return Err(AppError::Config("internal resistance must be >= 0".to_string()));
    }
    if !(model.noise_v.is_finite() && model.noise_v >= 0.0) {
        return Err(AppError::Config("voltage noise must be >= 0".to_string()));
    }
    Ok(())
}
