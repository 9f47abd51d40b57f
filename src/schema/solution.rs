//! Result types for the exact solvers.

use serde::{Deserialize, Serialize};

use super::Position;

/// Outcome of a Dijkstra or A* search.
///
/// An unreachable goal is reported with `success == false`, an empty path and
/// zero cost; it is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Whether the goal was reached.
    pub success: bool,
    /// Total cost of the path (start cell excluded).
    pub cost: u64,
    /// Start-to-goal path, inclusive.
    pub path: Vec<Position>,
    /// Number of queue entries popped.
    pub nodes_visited: usize,
    /// Wall time spent searching.
    pub elapsed_seconds: f64,
}
