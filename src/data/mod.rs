//! Sample generation and reconciliation.
//!
//! - `sample`: oversample-filter-pad draws for a single segment
//! - `reconcile`: all segments on one grid plus the display scale

pub mod reconcile;
pub mod sample;

pub use reconcile::*;
pub use sample::*;
