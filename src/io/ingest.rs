//! CSV ingest.
//!
//! Turns a measurement log into a rectangular numeric `Table`. The table is
//! then sliced into `(x, y)` sample series by column index.
//!
//! Design goals:
//! - **Strict schema**: every row has the same width and every field is a number
//! - **Precise errors**: file, 1-based line and column, and the offending text
//! - **No fitting logic here**

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::{CsvOptions, SampleSeries};
use crate::error::ParseError;

/// Source of numeric tables.
pub trait SampleLoader {
    fn load(&self, path: &Path) -> Result<Table, ParseError>;
}

/// Loader for delimited text files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLoader {
    options: CsvOptions,
}

impl CsvLoader {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }
}

impl SampleLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Table, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.options.has_header)
            .delimiter(self.options.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut rows = 0usize;

        for result in reader.records() {
            let record = result.map_err(|source| ParseError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let line = record.position().map_or(rows as u64 + 1, |p| p.line());

            if rows == 0 {
                if record.len() < 2 {
                    return Err(ParseError::TooFewColumns {
                        path: path.to_path_buf(),
                        found: record.len(),
                    });
                }
                columns = vec![Vec::new(); record.len()];
            } else if record.len() != columns.len() {
                return Err(ParseError::Ragged {
                    path: path.to_path_buf(),
                    line,
                    expected: columns.len(),
                    found: record.len(),
                });
            }

            for (j, field) in record.iter().enumerate() {
                let value = parse_number(field).ok_or_else(|| ParseError::NonNumeric {
                    path: path.to_path_buf(),
                    line,
                    column: j + 1,
                    value: field.to_string(),
                })?;
                columns[j].push(value);
            }
            rows += 1;
        }

        if rows == 0 {
            return Err(ParseError::Empty {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), rows, columns = columns.len(), "loaded table");
        Ok(Table {
            path: path.to_path_buf(),
            columns,
            rows,
        })
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Rectangular numeric grid read from one file, stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    path: PathBuf,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl Table {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Result<&[f64], ParseError> {
        self.columns
            .get(index)
            .map(Vec::as_slice)
            .ok_or(ParseError::MissingColumn {
                column: index,
                available: self.columns.len(),
            })
    }

    /// Pair two columns into a sample series.
    pub fn series(&self, x_col: usize, y_col: usize) -> Result<SampleSeries, ParseError> {
        let x = self.column(x_col)?.to_vec();
        let y = self.column(y_col)?.to_vec();
        SampleSeries::new(x, y)
    }
}
