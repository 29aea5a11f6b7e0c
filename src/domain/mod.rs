//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the typed sample series (`SampleSeries`)
//! - configuration (`Analysis`, `FitSpec`, `FitConfig`, `PlotMode`)
//! - fit outputs (`FitResult`, `CurveModel`, `FitQuality`, `FitDiagnostics`)

pub mod types;

pub use types::*;
