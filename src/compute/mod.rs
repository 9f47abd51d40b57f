//! Compute module - grid model and the three solvers.

mod exact;
mod grid;

pub mod evolution;

pub use exact::*;
pub use grid::*;
