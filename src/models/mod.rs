//! Distribution family evaluators.
//!
//! The fitter and the reconciler only need a handful of primitives (density,
//! quantile, random draws), so each family is a small value type exposing them.

pub mod johnson_su;

pub use johnson_su::*;
