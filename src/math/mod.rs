//! Mathematical utilities: B-spline primitives, banded solves and least squares.

pub mod banded;
pub mod bspline;
pub mod ols;

pub use ols::*;
