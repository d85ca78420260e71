//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`Clast`) and configuration structs (`BinConfig`, `MergeConfig`, ...)
//! - intermediate aggregates (`SievedBins`, `MergedBins`, `CumulativeCurve`)
//! - fit outputs (`DistributionFit`, `FractalFit`) and the report schema

pub mod types;

pub use types::*;

