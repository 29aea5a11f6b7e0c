//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (CSV) (`export`)
//! - curve JSON read/write (`curve`)
//! - TOML job files (`job`)

pub mod curve;
pub mod export;
pub mod ingest;
pub mod job;

pub use curve::*;
pub use export::*;
pub use ingest::*;
pub use job::*;
