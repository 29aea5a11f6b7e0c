//! Export per-sample results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Training rows come first, then validation rows (if any).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::SampleResidual;
use crate::error::AppError;

/// Write observed vs fitted values to a CSV file.
pub fn write_results_csv(
    path: &Path,
    training: &[SampleResidual],
    validation: &[SampleResidual],
) -> Result<(), AppError> {
    let io_err = |e| AppError::io(format!("failed to write results CSV '{}'", path.display()), e);
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "set,index,x,y_obs,y_fit,residual").map_err(io_err)?;
    let sets = [("train", training), ("validation", validation)];
    for (set, rows) in sets {
        for r in rows {
            writeln!(
                out,
                "{set},{},{:.10},{:.10},{:.10},{:.10}",
                r.index, r.x, r.y_obs, r.y_fit, r.residual
            )
            .map_err(io_err)?;
        }
    }
    out.flush().map_err(io_err)?;

    tracing::info!(
        path = %path.display(),
        rows = training.len() + validation.len(),
        "wrote results CSV"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(index: usize, x: f64, y_obs: f64, y_fit: f64) -> SampleResidual {
        SampleResidual {
            index,
            x,
            y_obs,
            y_fit,
            residual: y_obs - y_fit,
        }
    }

    #[test]
    fn writes_header_and_both_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_results_csv(
            &path,
            &[residual(0, 4.0, 0.0, 0.1), residual(1, 3.9, 0.5, 0.45)],
            &[residual(0, 3.8, 0.8, 0.7)],
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "set,index,x,y_obs,y_fit,residual");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("train,0,4.0000000000,"));
        assert!(lines[3].starts_with("validation,0,3.8000000000,"));
    }
}
