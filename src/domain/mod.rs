//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input snapshots (`Parameters`, `SegmentSpec`, `MainSegmentSpec`, `Benchmarks`)
//! - fitting inputs and outcomes (`MomentTarget`, `JohnsonSuParams`, `FitResult`)

pub mod types;

pub use types::*;
