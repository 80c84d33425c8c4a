//! `dist-explorer` library crate.
//!
//! The binary (`dx`) is a thin wrapper around this library so that:
//!
//! - the render pass is testable without a terminal
//! - numerics (moments, solver, sampling, binning) stay separate from drawing
//!
//! Data flow for one render pass:
//!
//! `Parameters` -> `fit` (Johnson SU by moment matching) -> `data` (draw, filter,
//! pad, bin) -> `app::pipeline::RenderInputs` -> `tui`

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
