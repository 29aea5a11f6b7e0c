//! Fitted curve representations.
//!
//! Models are small value types with pure evaluation so that fitting, reporting
//! and plotting code can stay generic over the fit strategy.

pub mod polynomial;
pub mod spline;

pub use polynomial::*;
pub use spline::*;
