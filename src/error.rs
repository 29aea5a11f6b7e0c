//! Error taxonomy.
//!
//! - `ParseError`: the input could not be turned into a valid sample series
//! - `FitError`: the samples are unsuitable for the chosen fit strategy
//! - `AppError`: everything the binary can fail with, including the two above
//!
//! `AppError::exit_code` keeps the process exit codes stable for scripting.

use std::path::PathBuf;

use thiserror::Error;

/// Input loading / series construction failures.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{}' line {line}, column {column}: '{value}' is not a number", path.display())]
    NonNumeric {
        path: PathBuf,
        line: u64,
        column: usize,
        value: String,
    },

    #[error("'{}' line {line}: expected {expected} columns, found {found}", path.display())]
    Ragged {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("'{}' contains no data rows", path.display())]
    Empty { path: PathBuf },

    #[error("'{}' has {found} column(s); at least 2 are required", path.display())]
    TooFewColumns { path: PathBuf, found: usize },

    #[error("column {column} requested but only {available} column(s) present")]
    MissingColumn { column: usize, available: usize },

    #[error("paired columns differ in length: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("sample series is empty")]
    EmptySeries,

    #[error("non-finite value at sample {index}")]
    NonFinite { index: usize },
}

/// Fit strategy failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("x has {x_len} values but y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },

    #[error("polynomial of degree {degree} needs at least {} samples, got {samples}", degree + 1)]
    Underdetermined { samples: usize, degree: usize },

    #[error("all x values are equal; a polynomial of degree {degree} is not identifiable")]
    DegenerateDomain { degree: usize },

    #[error("spline fit needs at least {required} samples, got {samples}")]
    TooFewSamples { samples: usize, required: usize },

    #[error(
        "spline fit needs strictly increasing x: x[{index}] = {value} follows {previous} (try --sort, duplicates must be removed)"
    )]
    NotStrictlyIncreasing {
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("smoothing factor must be finite and >= 0, got {0}")]
    InvalidSmoothing(f64),

    #[error("least-squares solve failed: {0}")]
    Solver(String),
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error("config error: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("plot error: {0}")]
    Plot(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Parse(_) => 2,
            AppError::Fit(_) => 3,
            AppError::Io { .. } | AppError::Plot(_) | AppError::Terminal(_) => 4,
        }
    }
}
