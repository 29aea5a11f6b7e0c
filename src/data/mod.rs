//! Sample data transforms and generators.
//!
//! - `normalize`: remaining → consumed conversion applied before fitting
//! - `sample`: synthetic discharge logs for trying the tool without lab data

pub mod normalize;
pub mod sample;

pub use normalize::*;
