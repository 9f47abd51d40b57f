//! Exact single-source shortest path search: Dijkstra and A*.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::schema::{Position, SearchResult};

use super::grid::PathProblem;

const NO_PARENT: usize = usize::MAX;

/// Uniform-cost search from start to goal.
pub fn dijkstra(problem: &PathProblem) -> SearchResult {
    best_first(problem, |_| 0)
}

/// A* search with the Manhattan distance to the goal as heuristic.
pub fn astar(problem: &PathProblem) -> SearchResult {
    let goal = problem.goal;
    best_first(problem, move |pos| pos.manhattan(goal) as u64)
}

/// Best-first search ordered by `g + heuristic(pos)`.
///
/// Heap entries are `(key, g, index)` so ordering never depends on anything
/// but the extracted key and deterministic tie-breakers. Entries whose `g`
/// exceeds the best recorded cost for their cell are stale and skipped.
fn best_first<H>(problem: &PathProblem, heuristic: H) -> SearchResult
where
    H: Fn(Position) -> u64,
{
    let start_time = Instant::now();
    let grid = &problem.grid;

    let mut best = vec![u64::MAX; grid.area()];
    let mut parent = vec![NO_PARENT; grid.area()];
    let mut heap: BinaryHeap<Reverse<(u64, u64, usize)>> = BinaryHeap::new();

    let start = grid.index(problem.start);
    let goal = grid.index(problem.goal);
    best[start] = 0;
    heap.push(Reverse((heuristic(problem.start), 0, start)));

    let mut nodes_visited = 0;
    let mut found = None;

    while let Some(Reverse((_, g, index))) = heap.pop() {
        nodes_visited += 1;

        if index == goal {
            found = Some(g);
            break;
        }

        if g > best[index] {
            continue;
        }

        let pos = grid.position(index);
        for next in grid.open_neighbors(pos) {
            let Some(step) = grid.cost(next) else {
                continue;
            };
            let next_g = g + step as u64;
            let next_index = grid.index(next);
            if next_g < best[next_index] {
                best[next_index] = next_g;
                parent[next_index] = index;
                heap.push(Reverse((next_g + heuristic(next), next_g, next_index)));
            }
        }
    }

    let elapsed_seconds = start_time.elapsed().as_secs_f64();

    match found {
        Some(cost) => {
            let mut path = Vec::new();
            let mut cursor = goal;
            while cursor != NO_PARENT {
                path.push(grid.position(cursor));
                cursor = parent[cursor];
            }
            path.reverse();

            log::debug!(
                "search reached {} with cost {} after {} pops",
                problem.goal,
                cost,
                nodes_visited
            );

            SearchResult {
                success: true,
                cost,
                path,
                nodes_visited,
                elapsed_seconds,
            }
        }
        None => {
            log::debug!(
                "goal {} unreachable, queue exhausted after {} pops",
                problem.goal,
                nodes_visited
            );
            SearchResult {
                success: false,
                cost: 0,
                path: Vec::new(),
                nodes_visited,
                elapsed_seconds,
            }
        }
    }
}
