//! Grain-size distribution construction.
//!
//! Responsibilities:
//!
//! - sieve raw `(diameter, volume)` pairs into fixed-width bins (`sieve`)
//! - merge two partially-overlapping populations (`merge`)
//! - build the normalized cumulative volume curve (`cumulative`)
//!
//! Everything here is a pure function of its arguments; no I/O, no state.

pub mod cumulative;
pub mod merge;
pub mod sieve;

pub use cumulative::*;
pub use merge::*;
pub use sieve::*;
