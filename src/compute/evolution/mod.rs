//! Memetic genetic search for grid paths.
//!
//! # Overview
//!
//! - **Genomes** (`genome`): per-step direction priorities plus the random
//!   operators (crossover, swap mutation, single-locus refinement)
//! - **Decoding** (`decode`): walks a genome across the grid with loop
//!   cutting, shortcut compaction and backtracking applied inline, then scores
//!   the walk
//! - **Smoothing** (`smoothing`): L-walk post-processing of goal-reaching paths
//! - **Search** (`search`): the generational loop with elitism, immigrants and
//!   refined children
//!
//! # Example
//!
//! ```rust,no_run
//! use gridpath::compute::evolution::GeneticPathfinder;
//! use gridpath::schema::{GaConfig, Scenario};
//!
//! let problem = Scenario::default().to_problem().unwrap();
//! let mut ga = GeneticPathfinder::new(problem, GaConfig::default()).unwrap();
//! let result = ga.run_with_callback(|progress| {
//!     if progress.is_improvement {
//!         println!("generation {}: cost {}", progress.generation, progress.cost);
//!     }
//! });
//! println!("reached goal: {}, cost {}", result.reached_goal, result.cost);
//! ```

mod decode;
mod genome;
mod search;
mod smoothing;

pub use decode::{
    COST_SCALE, DeadEndMemory, Decoded, GOAL_BONUS, PROXIMITY_SCALE, STUCK_FITNESS, Walker,
    goal_fitness, proximity_fitness,
};
pub use genome::{Genome, GenomeRng, Priority};
pub use search::{GeneticPathfinder, Individual};
pub use smoothing::smooth_path;
