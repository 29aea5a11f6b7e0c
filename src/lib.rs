//! `discharge-curves` library crate.
//!
//! Fits voltage/charge/energy relationships of a battery discharge with a
//! least-squares polynomial or a cubic smoothing spline.
//!
//! The binary (`dcfit`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - loaders, fitters and renderers can be used on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
