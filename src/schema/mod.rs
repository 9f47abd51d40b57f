//! Schema module - scenario, configuration and result types.

mod evolution;
mod scenario;
mod solution;

pub use evolution::*;
pub use scenario::*;
pub use solution::*;
