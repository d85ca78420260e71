//! Mathematical utilities: linear and damped nonlinear least squares.

pub mod lm;
pub mod ols;

pub use lm::*;
pub use ols::*;
