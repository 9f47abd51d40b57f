//! Gridpath - shortest paths on weighted grids, exact and evolutionary.
//!
//! This crate solves single-source single-target shortest path problems on
//! 4-connected grids whose cells carry positive traversal costs, and compares
//! two exact solvers against a memetic genetic search.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Scenario, configuration, progress and result types (serde)
//! - `compute`: Grid model, Dijkstra and A*, and the genetic pathfinder
//!
//! # Example
//!
//! ```rust,no_run
//! use gridpath::{
//!     schema::{GaConfig, Scenario},
//!     compute::{astar, evolution::GeneticPathfinder},
//! };
//!
//! let problem = Scenario::default().to_problem().unwrap();
//!
//! let exact = astar(&problem);
//! println!("A*: cost {} after {} pops", exact.cost, exact.nodes_visited);
//!
//! let mut ga = GeneticPathfinder::new(problem, GaConfig::default()).unwrap();
//! let result = ga.run();
//! println!("GA: reached {}, cost {}", result.reached_goal, result.cost);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::GeneticPathfinder;
pub use compute::{Grid, PathProblem, astar, dijkstra};
pub use schema::{GaConfig, GaResult, Position, Scenario, SearchResult};
