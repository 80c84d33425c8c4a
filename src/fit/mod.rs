//! Distribution fitting for the main segment.
//!
//! Responsibilities:
//!
//! - solve for Johnson SU parameters matching target moments
//! - decide when no usable fit exists (zero count, degenerate input, no convergence)

pub mod fitter;

pub use fitter::*;
