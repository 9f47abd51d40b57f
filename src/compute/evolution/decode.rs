//! Genome decoding: simulate the walk a genome describes and score it.
//!
//! The walker starts at the problem's start cell and consumes one locus per
//! step. Repair operators run inline while the walk is built, so the decoded
//! path never contains the same cell twice.

use crate::compute::{Grid, PathProblem};
use crate::schema::{Heuristics, Position, ProximityMetric};

use super::genome::{Genome, Priority};

/// Fitness floor for any walk that reaches the goal.
pub const GOAL_BONUS: f64 = 1_000_000.0;
/// Scale of the cost term for goal-reaching walks.
pub const COST_SCALE: f64 = 10_000_000.0;
/// Scale of the proximity term for walks that miss the goal.
pub const PROXIMITY_SCALE: f64 = 10_000.0;
/// Fitness of a walk that got stuck with backtracking disabled.
pub const STUCK_FITNESS: f64 = 0.001;

const NOT_ON_PATH: usize = usize::MAX;

/// Result of decoding one genome.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Start-to-end walk, never empty.
    pub path: Vec<Position>,
    /// Cost of `path`.
    pub cost: u64,
    /// Scalar fitness; higher is better.
    pub fitness: f64,
    /// Walk ended on the goal.
    pub reached_goal: bool,
    /// Walk halted with no usable move and backtracking disabled.
    pub stuck: bool,
    /// Loci consumed.
    pub steps_used: usize,
}

/// Cells ever backtracked out of during a run.
///
/// Only grows. Used for reporting; decoding never consults it.
#[derive(Debug, Clone)]
pub struct DeadEndMemory {
    cells: Vec<bool>,
    count: usize,
}

impl DeadEndMemory {
    pub fn new(grid: &Grid) -> Self {
        Self {
            cells: vec![false; grid.area()],
            count: 0,
        }
    }

    fn mark(&mut self, index: usize) {
        if !self.cells[index] {
            self.cells[index] = true;
            self.count += 1;
        }
    }

    pub fn contains(&self, grid: &Grid, pos: Position) -> bool {
        grid.in_bounds(pos) && self.cells[grid.index(pos)]
    }

    /// Number of marked cells.
    pub fn cell_count(&self) -> usize {
        self.count
    }

    /// Marked cells in row-major order.
    pub fn positions(&self, grid: &Grid) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, marked)| **marked)
            .map(|(index, _)| grid.position(index))
            .collect()
    }
}

/// Reusable decode state for one problem.
///
/// Scratch arrays are allocated once and cleared between decodes.
pub struct Walker<'a> {
    problem: &'a PathProblem,
    heuristics: Heuristics,
    proximity: ProximityMetric,
    path: Vec<Position>,
    /// Path index of each cell, or `NOT_ON_PATH`.
    path_index: Vec<usize>,
    /// Cells retreated out of during the current decode.
    dead: Vec<bool>,
    dead_list: Vec<usize>,
    cost: u64,
}

impl<'a> Walker<'a> {
    pub fn new(
        problem: &'a PathProblem,
        heuristics: Heuristics,
        proximity: ProximityMetric,
    ) -> Self {
        let area = problem.grid.area();
        Self {
            problem,
            heuristics,
            proximity,
            path: Vec::new(),
            path_index: vec![NOT_ON_PATH; area],
            dead: vec![false; area],
            dead_list: Vec::new(),
            cost: 0,
        }
    }

    /// Decode `genome`, consuming at most `budget` loci.
    ///
    /// Cells retreated out of are recorded in `memory`.
    pub fn decode(
        &mut self,
        genome: &Genome,
        budget: usize,
        memory: &mut DeadEndMemory,
    ) -> Decoded {
        self.reset();

        let problem = self.problem;
        let start = problem.start;
        let goal = problem.goal;

        self.path.push(start);
        self.path_index[problem.grid.index(start)] = 0;

        let budget = budget.min(genome.len());
        let mut reached_goal = start == goal;
        let mut stuck = false;
        let mut steps_used = 0;

        while !reached_goal && steps_used < budget {
            let priority = *genome.locus(steps_used);
            steps_used += 1;

            if self.advance(priority) {
                reached_goal = self.tail() == goal;
                continue;
            }

            if !self.heuristics.backtrack {
                stuck = true;
                break;
            }

            if !self.backtrack(memory) {
                // Retreated to the start and nothing is left to explore.
                break;
            }
        }

        let end = self.tail();
        let fitness = if reached_goal {
            goal_fitness(self.cost)
        } else if stuck {
            STUCK_FITNESS
        } else {
            proximity_fitness(self.proximity, end, problem)
        };

        Decoded {
            path: self.path.clone(),
            cost: self.cost,
            fitness,
            reached_goal,
            stuck,
            steps_used,
        }
    }

    fn reset(&mut self) {
        for pos in self.path.drain(..) {
            self.path_index[self.problem.grid.index(pos)] = NOT_ON_PATH;
        }
        for index in self.dead_list.drain(..) {
            self.dead[index] = false;
        }
        self.cost = 0;
    }

    #[inline]
    fn tail(&self) -> Position {
        self.path[self.path.len() - 1]
    }

    /// Take the first usable move of `priority`. Returns false if none was.
    fn advance(&mut self, priority: Priority) -> bool {
        let problem = self.problem;
        let grid = &problem.grid;
        let here = self.tail();

        for dir in priority.order() {
            let Some(next) = grid.neighbor(here, dir) else {
                continue;
            };
            let Some(step_cost) = grid.cost(next) else {
                continue;
            };
            let index = grid.index(next);
            if self.dead[index] {
                continue;
            }

            let earlier = self.path_index[index];
            if earlier != NOT_ON_PATH {
                if self.heuristics.loop_cut {
                    self.truncate(earlier + 1);
                    return true;
                }
                continue;
            }

            self.path_index[index] = self.path.len();
            self.path.push(next);
            self.cost += step_cost as u64;

            if self.heuristics.shortcut {
                self.compact();
            }
            return true;
        }

        false
    }

    /// Drop every path cell from `len` onwards, refunding their costs.
    fn truncate(&mut self, len: usize) {
        let problem = self.problem;
        let grid = &problem.grid;
        while self.path.len() > len {
            let Some(pos) = self.path.pop() else {
                break;
            };
            self.path_index[grid.index(pos)] = NOT_ON_PATH;
            self.cost -= grid.cost(pos).unwrap_or(0) as u64;
        }
    }

    /// Splice out the detour between the tail and the earliest non-adjacent
    /// path cell it touches.
    fn compact(&mut self) {
        let problem = self.problem;
        let grid = &problem.grid;
        let last = self.path.len() - 1;
        let here = self.path[last];

        let earliest = grid
            .open_neighbors(here)
            .map(|n| self.path_index[grid.index(n)])
            .filter(|&i| i != NOT_ON_PATH && i + 1 < last)
            .min();

        let Some(anchor) = earliest else {
            return;
        };

        for pos in self.path.drain(anchor + 1..last) {
            self.path_index[grid.index(pos)] = NOT_ON_PATH;
            self.cost -= grid.cost(pos).unwrap_or(0) as u64;
        }
        self.path_index[grid.index(here)] = anchor + 1;
    }

    /// Retreat along the path until the tail has an open neighbour.
    ///
    /// Returns false once only the start remains and it has nowhere to go.
    fn backtrack(&mut self, memory: &mut DeadEndMemory) -> bool {
        let problem = self.problem;
        let grid = &problem.grid;
        loop {
            if self.path.len() <= 1 {
                return false;
            }

            let Some(pos) = self.path.pop() else {
                return false;
            };
            let index = grid.index(pos);
            self.path_index[index] = NOT_ON_PATH;
            self.cost -= grid.cost(pos).unwrap_or(0) as u64;
            self.dead[index] = true;
            self.dead_list.push(index);
            memory.mark(index);

            let tail = self.tail();
            let has_exit = grid.open_neighbors(tail).any(|n| {
                let i = grid.index(n);
                !self.dead[i] && self.path_index[i] == NOT_ON_PATH
            });
            if has_exit {
                return true;
            }
        }
    }
}

/// Fitness of a goal-reaching walk: dominated by the bonus, strictly
/// decreasing in cost.
pub fn goal_fitness(cost: u64) -> f64 {
    GOAL_BONUS + COST_SCALE / (cost as f64 + 1.0)
}

/// Fitness of a walk that ended at `end` without reaching the goal.
///
/// Always above [`STUCK_FITNESS`] and below [`GOAL_BONUS`].
pub fn proximity_fitness(metric: ProximityMetric, end: Position, problem: &PathProblem) -> f64 {
    let score = match metric {
        ProximityMetric::GoalDistance => {
            let d = end.manhattan(problem.goal) as f64;
            PROXIMITY_SCALE / (d * d + 1.0)
        }
        ProximityMetric::StartDistance => {
            let d = end.manhattan(problem.start) as f64;
            PROXIMITY_SCALE * d / (d + 1.0)
        }
    };
    STUCK_FITNESS + score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Direction;
    use crate::compute::evolution::GenomeRng;
    use std::collections::HashSet;

    fn prefer(dir: Direction) -> Priority {
        let mut order = Direction::ALL;
        let at = order.iter().position(|&d| d == dir).unwrap();
        order.swap(0, at);
        Priority::new(order).unwrap()
    }

    fn genome(dirs: &[Direction]) -> Genome {
        Genome::from_loci(dirs.iter().map(|&d| prefer(d)).collect())
    }

    fn problem(cells: Vec<Vec<i32>>, start: (usize, usize), goal: (usize, usize)) -> PathProblem {
        PathProblem::new(Grid::new(cells).unwrap(), start.into(), goal.into()).unwrap()
    }

    fn only(f: impl FnOnce(&mut Heuristics)) -> Heuristics {
        let mut h = Heuristics::none();
        f(&mut h);
        h
    }

    fn positions(cells: &[(usize, usize)]) -> Vec<Position> {
        cells.iter().map(|&c| c.into()).collect()
    }

    #[test]
    fn test_straight_corridor() {
        use Direction::*;
        let p = problem(vec![vec![1, 2, 3, 4]], (0, 0), (0, 3));
        let mut memory = DeadEndMemory::new(&p.grid);
        let mut walker = Walker::new(&p, Heuristics::none(), ProximityMetric::GoalDistance);

        let decoded = walker.decode(&genome(&[Right, Right, Right, Right]), 4, &mut memory);
        assert!(decoded.reached_goal);
        assert_eq!(decoded.cost, 9);
        assert_eq!(decoded.steps_used, 3);
        assert_eq!(decoded.path.len(), 4);
        assert_eq!(decoded.fitness, goal_fitness(9));
    }

    #[test]
    fn test_walls_and_bounds_fall_through_to_next_priority() {
        use Direction::*;
        let p = problem(vec![vec![1, -1], vec![1, 1]], (0, 0), (1, 1));
        let mut memory = DeadEndMemory::new(&p.grid);
        let mut walker = Walker::new(&p, Heuristics::none(), ProximityMetric::GoalDistance);

        // Up is out of bounds, Right is a wall: both fall through.
        let order = Priority::new([Up, Right, Down, Left]).unwrap();
        let decoded = walker.decode(&Genome::from_loci(vec![order, prefer(Right)]), 2, &mut memory);
        assert!(decoded.reached_goal);
        assert_eq!(decoded.path, positions(&[(0, 0), (1, 0), (1, 1)]));
    }

    #[test]
    fn test_loop_cut_collapses_to_revisited_cell() {
        use Direction::*;
        let p = problem(vec![vec![1, 1, 1], vec![1, 1, 1]], (0, 0), (1, 2));
        let mut memory = DeadEndMemory::new(&p.grid);
        let heuristics = only(|h| h.loop_cut = true);
        let mut walker = Walker::new(&p, heuristics, ProximityMetric::GoalDistance);

        let decoded = walker.decode(&genome(&[Right, Down, Left, Up]), 4, &mut memory);
        assert!(!decoded.reached_goal);
        assert!(!decoded.stuck);
        assert_eq!(decoded.path, positions(&[(0, 0)]));
        assert_eq!(decoded.cost, 0);
        assert_eq!(decoded.steps_used, 4);
    }

    #[test]
    fn test_revisit_rejected_without_loop_cut() {
        use Direction::*;
        let p = problem(vec![vec![1, 1, 1], vec![1, 1, 1]], (0, 0), (1, 2));
        let mut memory = DeadEndMemory::new(&p.grid);
        let mut walker = Walker::new(&p, Heuristics::none(), ProximityMetric::GoalDistance);

        // At (1, 0): up and right are on the path, down and left out of bounds.
        let decoded = walker.decode(&genome(&[Right, Down, Left, Up]), 4, &mut memory);
        assert!(decoded.stuck);
        assert_eq!(decoded.fitness, STUCK_FITNESS);
        assert_eq!(decoded.path, positions(&[(0, 0), (0, 1), (1, 1), (1, 0)]));
    }

    #[test]
    fn test_backtrack_retreats_and_records_dead_ends() {
        use Direction::*;
        let p = problem(vec![vec![1, 1, 1], vec![1, 1, 1]], (0, 0), (1, 2));
        let mut memory = DeadEndMemory::new(&p.grid);
        let heuristics = only(|h| h.backtrack = true);
        let mut walker = Walker::new(&p, heuristics, ProximityMetric::GoalDistance);

        let decoded = walker.decode(&genome(&[Right, Down, Left, Up]), 4, &mut memory);
        assert!(!decoded.stuck);
        assert_eq!(decoded.path, positions(&[(0, 0), (0, 1), (1, 1)]));
        assert_eq!(decoded.cost, 2);
        assert_eq!(memory.positions(&p.grid), positions(&[(1, 0)]));

        // With budget left the walk resumes from the retreat point.
        let decoded = walker.decode(&genome(&[Right, Down, Left, Up, Right]), 5, &mut memory);
        assert!(decoded.reached_goal);
        assert_eq!(decoded.path, positions(&[(0, 0), (0, 1), (1, 1), (1, 2)]));
        assert_eq!(decoded.cost, 3);
    }

    #[test]
    fn test_shortcut_keeps_earliest_anchor() {
        use Direction::*;
        let p = problem(vec![vec![1; 3]; 3], (0, 0), (2, 0));
        let mut memory = DeadEndMemory::new(&p.grid);
        let heuristics = only(|h| h.shortcut = true);
        let mut walker = Walker::new(&p, heuristics, ProximityMetric::GoalDistance);

        // Spiral inward: (1, 1) touches (0, 1) at index 1 and (1, 2) at index 3.
        let decoded = walker.decode(&genome(&[Right, Right, Down, Down, Left, Up]), 6, &mut memory);
        assert_eq!(decoded.path, positions(&[(0, 0), (0, 1), (1, 1)]));
        assert_eq!(decoded.cost, 2);
    }

    #[test]
    fn test_dead_end_branch() {
        use Direction::*;
        let cells = vec![
            vec![1, 1, 1, 1, 1, 1],
            vec![-1, -1, 1, -1, -1, -1],
            vec![-1, -1, 1, -1, -1, -1],
        ];
        let p = problem(cells, (0, 0), (0, 5));
        let dive = genome(&[Right, Right, Down, Down, Right, Right, Right, Right, Right, Right]);

        let mut memory = DeadEndMemory::new(&p.grid);
        let mut walker = Walker::new(&p, Heuristics::none(), ProximityMetric::GoalDistance);
        let decoded = walker.decode(&dive, dive.len(), &mut memory);
        assert!(decoded.stuck);
        assert_eq!(decoded.fitness, STUCK_FITNESS);

        let heuristics = only(|h| h.backtrack = true);
        let mut walker = Walker::new(&p, heuristics, ProximityMetric::GoalDistance);
        let decoded = walker.decode(&dive, dive.len(), &mut memory);
        assert!(decoded.reached_goal);
        assert_eq!(decoded.cost, 5);
        assert!(memory.contains(&p.grid, Position::new(2, 2)));
        assert!(memory.contains(&p.grid, Position::new(1, 2)));
        assert_eq!(memory.cell_count(), 2);
    }

    #[test]
    fn test_budget_limits_walk() {
        use Direction::*;
        let p = problem(vec![vec![1; 6]], (0, 0), (0, 5));
        let mut memory = DeadEndMemory::new(&p.grid);
        let mut walker = Walker::new(&p, Heuristics::all(), ProximityMetric::GoalDistance);

        let decoded = walker.decode(&genome(&[Right; 10]), 3, &mut memory);
        assert!(!decoded.reached_goal);
        assert_eq!(decoded.steps_used, 3);
        assert_eq!(decoded.path.len(), 4);
        let expected = proximity_fitness(ProximityMetric::GoalDistance, Position::new(0, 3), &p);
        assert_eq!(decoded.fitness, expected);
    }

    #[test]
    fn test_random_walks_never_revisit() {
        let p = problem(vec![vec![1; 8]; 8], (0, 0), (7, 7));
        let mut memory = DeadEndMemory::new(&p.grid);
        let mut rng = GenomeRng::new(11);

        for heuristics in [Heuristics::all(), Heuristics::none(), only(|h| h.loop_cut = true)] {
            let mut walker = Walker::new(&p, heuristics, ProximityMetric::GoalDistance);
            for _ in 0..50 {
                let g = rng.random_genome(5 * p.grid.area());
                let decoded = walker.decode(&g, g.len(), &mut memory);
                let unique: HashSet<_> = decoded.path.iter().collect();
                assert_eq!(unique.len(), decoded.path.len());
                assert_eq!(p.grid.path_cost(&decoded.path), Some(decoded.cost));
            }
        }
    }

    #[test]
    fn test_fitness_ordering() {
        let p = problem(vec![vec![1; 10]; 10], (0, 0), (9, 9));
        let far = proximity_fitness(ProximityMetric::GoalDistance, Position::new(0, 0), &p);
        let near = proximity_fitness(ProximityMetric::GoalDistance, Position::new(8, 9), &p);
        assert!(STUCK_FITNESS < far);
        assert!(far < near);
        assert!(near < goal_fitness(u64::from(u32::MAX)));
        assert!(goal_fitness(20) < goal_fitness(18));

        let out = proximity_fitness(ProximityMetric::StartDistance, Position::new(5, 5), &p);
        let home = proximity_fitness(ProximityMetric::StartDistance, Position::new(0, 0), &p);
        assert!(home < out);
        assert!(home > STUCK_FITNESS - f64::EPSILON);
    }
}
