//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit the distribution families to the cumulative curve (parallel)
//! - estimate the fractal dimension from the log-log count census

pub mod fitter;
pub mod fractal;

pub use fitter::*;
pub use fractal::*;
