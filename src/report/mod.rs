//! Reporting utilities: legend labels and fit summaries.

pub mod format;

pub use format::*;
