//! Plot data preparation.
//!
//! Everything the chart needs is computed here as plain vectors so drawing code
//! only maps numbers to pixels.

pub mod histogram;

pub use histogram::*;
