//! L-walk path smoothing.
//!
//! Replaces meandering stretches of a walk with straight or single-corner
//! segments when that is strictly cheaper (or as cheap and shorter).

use std::collections::HashMap;

use crate::compute::Grid;
use crate::schema::Position;

/// Smooth `path` to a fixed point.
///
/// Endpoints are preserved, cost and length never increase and the result is a
/// 4-connected walk without repeated cells. Smoothing the output again returns
/// it unchanged.
pub fn smooth_path(grid: &Grid, path: &[Position]) -> Vec<Position> {
    let mut current = path.to_vec();
    loop {
        let next = remove_loops(&smooth_pass(grid, &current));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One anchor sweep from the start of the path.
fn smooth_pass(grid: &Grid, path: &[Position]) -> Vec<Position> {
    if path.len() < 3 {
        return path.to_vec();
    }

    // prefix[i] = cost of path[..=i], excluding the first cell
    let mut prefix = Vec::with_capacity(path.len());
    prefix.push(0u64);
    for &pos in &path[1..] {
        let step = grid.cost(pos).map_or(u64::MAX / 4, u64::from);
        prefix.push(prefix[prefix.len() - 1].saturating_add(step));
    }

    let mut out = vec![path[0]];
    let mut anchor = 0;

    while anchor < path.len() - 1 {
        let mut jumped = false;

        for target in (anchor + 2..path.len()).rev() {
            let Some(walk) = l_walk(grid, path[anchor], path[target]) else {
                continue;
            };
            let Some(walk_cost) = grid.path_cost(&walk) else {
                continue;
            };

            let segment = (prefix[target] - prefix[anchor], target - anchor + 1);
            if (walk_cost, walk.len()) < segment {
                out.extend_from_slice(&walk[1..]);
                anchor = target;
                jumped = true;
                break;
            }
        }

        if !jumped {
            anchor += 1;
            out.push(path[anchor]);
        }
    }

    out
}

/// Wall-free walk from `from` to `to` with at most one corner.
///
/// Tries the vertical leg first, then the horizontal one.
fn l_walk(grid: &Grid, from: Position, to: Position) -> Option<Vec<Position>> {
    let vertical_first = Position::new(to.row, from.col);
    let horizontal_first = Position::new(from.row, to.col);

    walk_via(grid, from, vertical_first, to).or_else(|| walk_via(grid, from, horizontal_first, to))
}

fn walk_via(grid: &Grid, from: Position, corner: Position, to: Position) -> Option<Vec<Position>> {
    let mut walk = Vec::with_capacity(from.manhattan(to) + 1);
    walk.push(from);
    straight(grid, from, corner, &mut walk)?;
    straight(grid, corner, to, &mut walk)?;
    Some(walk)
}

/// Append the cells strictly after `from` up to and including `to`.
/// The two must share a row or a column.
fn straight(grid: &Grid, from: Position, to: Position, walk: &mut Vec<Position>) -> Option<()> {
    let mut pos = from;
    while pos != to {
        pos = if pos.row != to.row {
            let row = if to.row > pos.row { pos.row + 1 } else { pos.row - 1 };
            Position::new(row, pos.col)
        } else {
            let col = if to.col > pos.col { pos.col + 1 } else { pos.col - 1 };
            Position::new(pos.row, col)
        };
        if !grid.is_traversable(pos) {
            return None;
        }
        walk.push(pos);
    }
    Some(())
}

/// Cut every cycle: when a cell reappears, drop everything after its first
/// occurrence.
fn remove_loops(path: &[Position]) -> Vec<Position> {
    let mut out: Vec<Position> = Vec::with_capacity(path.len());
    let mut seen: HashMap<Position, usize> = HashMap::with_capacity(path.len());

    for &pos in path {
        if let Some(&first) = seen.get(&pos) {
            for dropped in out.drain(first + 1..) {
                seen.remove(&dropped);
            }
        } else {
            seen.insert(pos, out.len());
            out.push(pos);
        }
    }

    out
}
