//! Direction-priority genomes and the random operators that act on them.
//!
//! A genome is a fixed-length sequence of loci. Each locus is a permutation of
//! the four moves: the order in which the simulated walker tries them at that
//! step. Operators only ever reorder a permutation, so every locus always
//! contains all four directions.

use rand::prelude::*;

use crate::compute::Direction;

/// Move preference order for one decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority([Direction; 4]);

impl Priority {
    /// Canonical order: up, down, left, right.
    pub const CANONICAL: Priority = Priority(Direction::ALL);

    /// Build a priority from an explicit order.
    ///
    /// Returns `None` unless `order` is a permutation of all four directions.
    pub fn new(order: [Direction; 4]) -> Option<Self> {
        let mut seen = [false; 4];
        for dir in order {
            seen[dir as usize] = true;
        }
        seen.iter().all(|&s| s).then_some(Self(order))
    }

    /// Directions in preference order.
    #[inline]
    pub fn order(&self) -> [Direction; 4] {
        self.0
    }

    /// Most preferred direction.
    #[inline]
    pub fn first(&self) -> Direction {
        self.0[0]
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    /// Move `dir` to the front, swapping it with the current first choice.
    fn promote(&mut self, dir: Direction) {
        if let Some(at) = self.0.iter().position(|&d| d == dir) {
            self.0.swap(0, at);
        }
    }
}

/// Fixed-length sequence of per-step priorities.
///
/// Cloning is a deep copy; no two individuals ever share loci.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    loci: Vec<Priority>,
}

impl Genome {
    /// Genome with an explicit list of loci.
    pub fn from_loci(loci: Vec<Priority>) -> Self {
        Self { loci }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.loci.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    #[inline]
    pub fn locus(&self, index: usize) -> &Priority {
        &self.loci[index]
    }

    #[inline]
    pub fn loci(&self) -> &[Priority] {
        &self.loci
    }
}

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniformly random permutation of the four directions.
    pub fn random_priority(&mut self) -> Priority {
        let mut order = Direction::ALL;
        order.shuffle(&mut self.rng);
        Priority(order)
    }

    /// Generate a random genome of `len` loci.
    pub fn random_genome(&mut self, len: usize) -> Genome {
        Genome {
            loci: (0..len).map(|_| self.random_priority()).collect(),
        }
    }

    /// Single-point crossover: loci before the cut from `parent1`, the rest
    /// from `parent2`.
    pub fn crossover(&mut self, parent1: &Genome, parent2: &Genome) -> Genome {
        let len = parent1.len().min(parent2.len());
        if len == 0 {
            return parent1.clone();
        }

        let cut = self.rng.gen_range(0..len);
        let mut loci = Vec::with_capacity(parent1.len());
        loci.extend_from_slice(&parent1.loci[..cut]);
        loci.extend_from_slice(&parent2.loci[cut..]);
        Genome { loci }
    }

    /// Swap mutation: each locus, with probability `rate`, has two of its
    /// priorities exchanged.
    pub fn mutate(&mut self, genome: &mut Genome, rate: f64) {
        if rate <= 0.0 {
            return;
        }

        for locus in &mut genome.loci {
            if self.rng.gen_bool(rate) {
                let a = self.rng.gen_range(0..4);
                let b = (a + self.rng.gen_range(1..4)) % 4;
                locus.swap(a, b);
            }
        }
    }

    /// Hill-climbing step: copy `genome` and give one locus within the first
    /// `active` loci a different first-choice direction.
    pub fn refine(&mut self, genome: &Genome, active: usize) -> Genome {
        let mut child = genome.clone();
        let span = active.clamp(1, child.len().max(1));
        if child.is_empty() {
            return child;
        }

        let point = self.rng.gen_range(0..span);
        let locus = &mut child.loci[point];
        let current = locus.first();
        let alternatives: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| d != current)
            .collect();
        if let Some(&dir) = alternatives.choose(&mut self.rng) {
            locus.promote(dir);
        }
        child
    }

    /// Bernoulli trial.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Uniform index in `0..bound`. `bound` must be positive.
    pub fn index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

#[cfg(test)]
impl Genome {
    /// Genome of `len` copies of the same priority.
    pub(crate) fn uniform(len: usize, priority: Priority) -> Self {
        Self {
            loci: vec![priority; len],
        }
    }

    /// Number of loci whose priorities differ.
    pub(crate) fn distance(&self, other: &Genome) -> usize {
        self.loci
            .iter()
            .zip(other.loci.iter())
            .filter(|(a, b)| a != b)
            .count()
            + self.len().abs_diff(other.len())
    }
}
