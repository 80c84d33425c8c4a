//! Input/output helpers.
//!
//! - preset JSON read/write (`preset`)

pub mod preset;

pub use preset::*;
