//! Terminal report formatting.

pub mod format;

pub use format::*;
