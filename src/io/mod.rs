//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - bin/clast/shape exports (CSV) (`export`)
//! - report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
