//! Mathematical utilities: Johnson SU moments and a small nonlinear solver.

pub mod lm;
pub mod moments;

pub use lm::*;
pub use moments::*;
