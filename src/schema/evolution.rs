//! Genetic pathfinder configuration, progress and result types.
//!
//! Every field of [`GaConfig`] has a serde default so partial JSON files such
//! as `{"population_size": 50}` are accepted.

use serde::{Deserialize, Serialize};

use super::Position;

/// Top-level configuration for the genetic pathfinder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    /// Individuals per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of generations to run.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Number of best genomes carried over unchanged.
    #[serde(default = "default_elitism_count")]
    pub elitism_count: usize,
    /// Per-locus probability of swapping two priorities (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Decode-time repair operators and memetic steps.
    #[serde(default)]
    pub heuristics: Heuristics,
    /// Genome length as a multiple of the grid area.
    #[serde(default = "default_genome_length_factor")]
    pub genome_length_factor: usize,
    /// Fitness assigned to walks that end without reaching the goal.
    #[serde(default)]
    pub proximity: ProximityMetric,
    /// Report progress every N generations (improvements are always reported).
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            elitism_count: default_elitism_count(),
            mutation_rate: default_mutation_rate(),
            heuristics: Heuristics::default(),
            genome_length_factor: default_genome_length_factor(),
            proximity: ProximityMetric::default(),
            report_interval: default_report_interval(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    200
}
fn default_generations() -> usize {
    500
}
fn default_elitism_count() -> usize {
    2
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_genome_length_factor() -> usize {
    5
}
fn default_report_interval() -> usize {
    1
}
fn default_true() -> bool {
    true
}

/// Independent toggles for the decode-time heuristics.
///
/// All of these change what a genome decodes to; none are cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Splice out detours when the walk touches an earlier path cell.
    #[serde(default = "default_true")]
    pub shortcut: bool,
    /// Collapse the path back to a revisited cell instead of rejecting the move.
    #[serde(default = "default_true")]
    pub loop_cut: bool,
    /// Retreat out of dead ends instead of halting.
    #[serde(default = "default_true")]
    pub backtrack: bool,
    /// L-walk smoothing of goal-reaching records.
    #[serde(default = "default_true")]
    pub smoothing: bool,
    /// Hill-climbing injection of single-locus mutants of the best genome.
    #[serde(default = "default_true")]
    pub refined_children: bool,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self::all()
    }
}

impl Heuristics {
    /// Every heuristic enabled.
    pub const fn all() -> Self {
        Self {
            shortcut: true,
            loop_cut: true,
            backtrack: true,
            smoothing: true,
            refined_children: true,
        }
    }

    /// Plain genetic search with no repair or memetic steps.
    pub const fn none() -> Self {
        Self {
            shortcut: false,
            loop_cut: false,
            backtrack: false,
            smoothing: false,
            refined_children: false,
        }
    }
}

/// Fitness metric for walks that do not reach the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProximityMetric {
    /// Inverse squared Manhattan distance from the walk's end to the goal.
    #[default]
    GoalDistance,
    /// Manhattan distance travelled away from the start.
    StartDistance,
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Phase of the search as seen by a progress observer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SearchPhase {
    /// No individual has reached the goal yet.
    #[default]
    Searching,
    /// The goal was reached this generation by a new record.
    GoalReached,
    /// A goal-reaching record exists and the search is refining it.
    Optimizing,
}

/// Per-generation snapshot delivered to the progress callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaProgress {
    /// Best-so-far path.
    pub path: Vec<Position>,
    /// Generation number, starting at 1.
    pub generation: usize,
    /// Cost of `path`.
    pub cost: u64,
    /// Seconds since the run started.
    pub elapsed_seconds: f64,
    /// Human-readable status line.
    pub status: String,
    /// Current phase.
    pub phase: SearchPhase,
    /// Every cell backtracked out of so far in this run.
    pub dead_ends: Vec<Position>,
    /// True when a goal-reaching record improved this generation.
    pub is_improvement: bool,
    /// Fitness of the best-so-far record.
    pub best_fitness: f64,
    /// Generations since the record fitness last changed.
    pub stagnation: usize,
}

/// Final result of a genetic pathfinder run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaResult {
    /// Whether the best-so-far record reaches the goal.
    pub reached_goal: bool,
    /// Cost of `path`.
    pub cost: u64,
    /// Best-so-far path (a partial walk when the goal was never reached).
    pub path: Vec<Position>,
    /// Wall time of the whole run.
    pub elapsed_seconds: f64,
    /// Run statistics.
    pub stats: GaStats,
}

/// Statistics from a genetic pathfinder run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaStats {
    /// Generations completed.
    pub generations: usize,
    /// Genome decodes performed.
    pub evaluations: u64,
    /// Fitness of the final record.
    pub best_fitness: f64,
    /// Size of the cumulative dead-end memory.
    pub dead_end_cells: usize,
    /// Reason the run stopped.
    pub stop_reason: StopReason,
}

/// Reason the run stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran the configured number of generations.
    MaxGenerations,
    /// Cancellation flag was raised.
    Cancelled,
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum GaConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Generation count must be positive")]
    NoGenerations,
    #[error("Elitism count {elitism} exceeds population size {population}")]
    ElitismTooLarge { elitism: usize, population: usize },
    #[error("Mutation rate {0} must be within 0.0-1.0")]
    InvalidMutationRate(f64),
    #[error("Genome length factor must be positive")]
    DegenerateGenome,
    #[error("Report interval must be positive")]
    InvalidReportInterval,
}

impl GaConfig {
    /// Validate configuration before any simulation work.
    pub fn validate(&self) -> Result<(), GaConfigError> {
        if self.population_size < 2 {
            return Err(GaConfigError::PopulationTooSmall);
        }

        if self.generations == 0 {
            return Err(GaConfigError::NoGenerations);
        }

        if self.elitism_count > self.population_size {
            return Err(GaConfigError::ElitismTooLarge {
                elitism: self.elitism_count,
                population: self.population_size,
            });
        }

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GaConfigError::InvalidMutationRate(self.mutation_rate));
        }

        if self.genome_length_factor == 0 {
            return Err(GaConfigError::DegenerateGenome);
        }

        if self.report_interval == 0 {
            return Err(GaConfigError::InvalidReportInterval);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = GaConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let config = GaConfig {
            population_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GaConfigError::PopulationTooSmall)
        ));

        let config = GaConfig {
            population_size: 4,
            elitism_count: 5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GaConfigError::ElitismTooLarge { .. })
        ));

        let config = GaConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GaConfigError::InvalidMutationRate(_))
        ));

        let config = GaConfig {
            genome_length_factor: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GaConfigError::DegenerateGenome)
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GaConfig =
            serde_json::from_str(r#"{"population_size": 50, "heuristics": {"backtrack": false}}"#)
                .unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.generations, 500);
        assert!(!config.heuristics.backtrack);
        assert!(config.heuristics.loop_cut);
        assert_eq!(config.proximity, ProximityMetric::GoalDistance);
    }

    #[test]
    fn test_serialization() {
        let config = GaConfig {
            random_seed: Some(7),
            heuristics: Heuristics::none(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.random_seed, Some(7));
        assert_eq!(parsed.heuristics, Heuristics::none());
    }
}
