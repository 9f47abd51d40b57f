//! Memetic genetic pathfinder.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::compute::PathProblem;
use crate::schema::{
    GaConfig, GaConfigError, GaProgress, GaResult, GaStats, Position, SearchPhase, StopReason,
};

use super::decode::{DeadEndMemory, Decoded, Walker, goal_fitness};
use super::genome::{Genome, GenomeRng};
use super::smoothing::smooth_path;

/// Step budget slack over the best path length once the goal is reached.
const BUDGET_SLACK: f64 = 1.05;
/// Per-slot probability of a refined child of the record genome.
const REFINE_PROBABILITY: f64 = 0.2;
/// Per-slot probability of a random immigrant.
const IMMIGRANT_RATE: f64 = 0.08;
/// Immigrant probability once the record has stagnated.
const STAGNANT_IMMIGRANT_RATE: f64 = 0.4;
/// Generations without record change before immigration is boosted.
const STAGNATION_THRESHOLD: usize = 40;
/// Smallest record fitness change that counts as progress.
const FITNESS_EPSILON: f64 = 1e-6;

/// A genome together with what it last decoded to.
#[derive(Debug, Clone)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: f64,
    pub cost: u64,
    pub path: Vec<Position>,
    pub reached_goal: bool,
    /// Halted with no usable move.
    pub stuck: bool,
    /// Loci consumed by the last decode.
    pub steps_used: usize,
}

impl Individual {
    fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: 0.0,
            cost: 0,
            path: Vec::new(),
            reached_goal: false,
            stuck: false,
            steps_used: 0,
        }
    }

    fn apply(&mut self, decoded: Decoded) {
        self.fitness = decoded.fitness;
        self.cost = decoded.cost;
        self.path = decoded.path;
        self.reached_goal = decoded.reached_goal;
        self.stuck = decoded.stuck;
        self.steps_used = decoded.steps_used;
    }
}

/// Genetic pathfinder over a single problem.
pub struct GeneticPathfinder {
    problem: PathProblem,
    config: GaConfig,
    rng: GenomeRng,
    population: Vec<Individual>,
    /// Best-so-far individual, possibly with a smoothed path.
    record: Option<Individual>,
    dead_ends: DeadEndMemory,
    genome_len: usize,
    budget: usize,
    generation: usize,
    evaluations: u64,
    stagnation_count: usize,
    cancelled: Arc<AtomicBool>,
}

impl GeneticPathfinder {
    /// Create a pathfinder. The configuration is validated up front.
    pub fn new(problem: PathProblem, config: GaConfig) -> Result<Self, GaConfigError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let genome_len = problem.grid.area() * config.genome_length_factor;
        let dead_ends = DeadEndMemory::new(&problem.grid);

        Ok(Self {
            problem,
            config,
            rng: GenomeRng::new(seed),
            population: Vec::new(),
            record: None,
            dead_ends,
            genome_len,
            budget: genome_len,
            generation: 0,
            evaluations: 0,
            stagnation_count: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Reset all run state and draw a fresh random population.
    fn initialize(&mut self) {
        self.population = (0..self.config.population_size)
            .map(|_| Individual::new(self.rng.random_genome(self.genome_len)))
            .collect();
        self.record = None;
        self.dead_ends = DeadEndMemory::new(&self.problem.grid);
        self.budget = self.genome_len;
        self.generation = 0;
        self.evaluations = 0;
        self.stagnation_count = 0;
    }

    /// Decode and score every individual.
    fn evaluate_population(&mut self) {
        let mut walker = Walker::new(&self.problem, self.config.heuristics, self.config.proximity);

        for individual in &mut self.population {
            let decoded = walker.decode(&individual.genome, self.budget, &mut self.dead_ends);
            individual.apply(decoded);
        }

        self.evaluations += self.population.len() as u64;

        log::trace!(
            "generation {}: {} reached goal, {} stuck, budget {}",
            self.generation,
            self.population.iter().filter(|i| i.reached_goal).count(),
            self.population.iter().filter(|i| i.stuck).count(),
            self.budget
        );
    }

    /// Fold this generation into the best-so-far record.
    ///
    /// Returns true when a goal-reaching record was set or improved.
    fn update_record(&mut self) -> bool {
        let candidate = self
            .population
            .iter()
            .filter(|i| i.reached_goal)
            .min_by_key(|i| i.cost);

        if let Some(candidate) = candidate {
            let mut candidate = candidate.clone();
            if self.config.heuristics.smoothing {
                self.smooth(&mut candidate);
            }

            let replace = match &self.record {
                Some(record) if record.reached_goal => candidate.cost < record.cost,
                _ => true,
            };
            if !replace {
                return false;
            }

            log::debug!(
                "generation {}: goal record cost {} over {} cells",
                self.generation,
                candidate.cost,
                candidate.path.len()
            );
            self.tighten_budget(candidate.path.len());
            self.record = Some(candidate);
            return true;
        }

        if self.record.as_ref().is_some_and(|r| r.reached_goal) {
            return false;
        }

        let fittest = self
            .population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness));
        if let Some(fittest) = fittest {
            let better = self
                .record
                .as_ref()
                .is_none_or(|record| fittest.fitness > record.fitness);
            if better {
                self.record = Some(fittest.clone());
            }
        }
        false
    }

    fn smooth(&self, individual: &mut Individual) {
        let grid = &self.problem.grid;
        let path = smooth_path(grid, &individual.path);
        if let Some(cost) = grid.path_cost(&path) {
            individual.path = path;
            individual.cost = cost;
            individual.fitness = goal_fitness(cost);
        }
    }

    fn tighten_budget(&mut self, best_len: usize) {
        let allowed = (best_len as f64 * BUDGET_SLACK).ceil() as usize;
        self.budget = self.genome_len.min(allowed);
    }

    fn record_fitness(&self) -> f64 {
        self.record.as_ref().map_or(0.0, |r| r.fitness)
    }

    /// Produce the next population from the current, sorted one.
    fn breed(&mut self) {
        let size = self.config.population_size;
        let mut next: Vec<Genome> = Vec::with_capacity(size);

        for individual in self.population.iter().take(self.config.elitism_count) {
            next.push(individual.genome.clone());
        }

        let refine_from = match &self.record {
            Some(record) if record.reached_goal && self.config.heuristics.refined_children => {
                Some((record.genome.clone(), record.steps_used))
            }
            _ => None,
        };

        let immigrant_rate = if self.stagnation_count > STAGNATION_THRESHOLD {
            STAGNANT_IMMIGRANT_RATE
        } else {
            IMMIGRANT_RATE
        };

        let parents = (self.population.len() / 2).max(1);

        while next.len() < size {
            if let Some((genome, active)) = &refine_from
                && self.rng.chance(REFINE_PROBABILITY)
            {
                next.push(self.rng.refine(genome, *active));
                continue;
            }

            if self.rng.chance(immigrant_rate) {
                next.push(self.rng.random_genome(self.genome_len));
                continue;
            }

            let a = self.rng.index(parents);
            let b = self.rng.index(parents);
            let mut child = self
                .rng
                .crossover(&self.population[a].genome, &self.population[b].genome);
            self.rng.mutate(&mut child, self.config.mutation_rate);
            next.push(child);
        }

        self.population = next.into_iter().map(Individual::new).collect();
    }

    /// Snapshot of the current record.
    fn progress(&self, improved: bool, first_goal: bool, elapsed: Duration) -> GaProgress {
        let (path, cost, reached_goal) = match &self.record {
            Some(record) => (record.path.clone(), record.cost, record.reached_goal),
            None => (vec![self.problem.start], 0, false),
        };

        let phase = if !reached_goal {
            SearchPhase::Searching
        } else if first_goal {
            SearchPhase::GoalReached
        } else {
            SearchPhase::Optimizing
        };

        let status = match phase {
            SearchPhase::Searching => format!(
                "Generation {}: searching, best walk ends at {}",
                self.generation,
                path.last().copied().unwrap_or(self.problem.start)
            ),
            SearchPhase::GoalReached => format!(
                "Generation {}: goal reached with cost {}",
                self.generation, cost
            ),
            SearchPhase::Optimizing => format!(
                "Generation {}: best cost {} (stagnant for {})",
                self.generation, cost, self.stagnation_count
            ),
        };

        GaProgress {
            path,
            generation: self.generation,
            cost,
            elapsed_seconds: elapsed.as_secs_f64(),
            status,
            phase,
            dead_ends: self.dead_ends.positions(&self.problem.grid),
            is_improvement: improved,
            best_fitness: self.record_fitness(),
            stagnation: self.stagnation_count,
        }
    }

    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if self.generation >= self.config.generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Run the search, reporting progress to `callback`.
    ///
    /// The cancellation flag is checked between generations.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> GaResult
    where
        F: FnMut(&GaProgress),
    {
        let start_time = Instant::now();

        self.initialize();
        log::info!(
            "genetic search: {}x{} grid, population {}, {} generations, genome length {}",
            self.problem.grid.rows(),
            self.problem.grid.cols(),
            self.config.population_size,
            self.config.generations,
            self.genome_len
        );

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            self.generation += 1;

            self.evaluate_population();

            let had_goal = self.record.as_ref().is_some_and(|r| r.reached_goal);
            let previous_fitness = self.record_fitness();
            let improved = self.update_record();

            self.population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

            if (self.record_fitness() - previous_fitness).abs() < FITNESS_EPSILON {
                self.stagnation_count += 1;
                if self.stagnation_count == STAGNATION_THRESHOLD + 1 {
                    log::debug!(
                        "generation {}: record stagnant, boosting immigration",
                        self.generation
                    );
                }
            } else {
                self.stagnation_count = 0;
            }

            let last = self.generation == self.config.generations;
            if improved || last || self.generation % self.config.report_interval == 0 {
                let first_goal = improved && !had_goal;
                callback(&self.progress(improved, first_goal, start_time.elapsed()));
            }

            if !last {
                self.breed();
            }
        };

        let elapsed_seconds = start_time.elapsed().as_secs_f64();

        let (reached_goal, cost, path) = match &self.record {
            Some(record) => (record.reached_goal, record.cost, record.path.clone()),
            None => (false, 0, vec![self.problem.start]),
        };

        log::info!(
            "genetic search stopped after {} generations ({:?}): goal reached {}, cost {}",
            self.generation,
            stop_reason,
            reached_goal,
            cost
        );

        GaResult {
            reached_goal,
            cost,
            path,
            elapsed_seconds,
            stats: GaStats {
                generations: self.generation,
                evaluations: self.evaluations,
                best_fitness: self.record_fitness(),
                dead_end_cells: self.dead_ends.cell_count(),
                stop_reason,
            },
        }
    }

    /// Run the search without progress reporting.
    pub fn run(&mut self) -> GaResult {
        self.run_with_callback(|_| {})
    }
}
