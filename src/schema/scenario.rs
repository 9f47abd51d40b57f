//! Scenario types: the grid, start and goal handed to every solver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compute::{Grid, PathProblem};

/// Cell value marking an impassable wall.
pub const WALL: i32 = -1;

/// A `(row, col)` grid coordinate.
///
/// Serialized as a two-element array so scenario files read `"start": [0, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another position.
    #[inline]
    pub fn manhattan(&self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// True if the two positions share an edge.
    #[inline]
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Position> for (usize, usize) {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A pathfinding scenario as read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Row-major cost matrix. `-1` is a wall, every other value is the cost
    /// of entering the cell and must be at least 1.
    pub cells: Vec<Vec<i32>>,
    /// Start cell.
    pub start: Position,
    /// Goal cell.
    pub goal: Position,
}

impl Default for Scenario {
    fn default() -> Self {
        // Small weighted maze with a cheap detour around a wall segment.
        let cells = vec![
            vec![1, 1, 1, 1, 1, 1, 1],
            vec![1, -1, -1, -1, -1, -1, 1],
            vec![1, 1, 5, 5, 1, -1, 1],
            vec![-1, -1, 1, -1, 1, -1, 1],
            vec![1, 1, 1, -1, 1, 1, 1],
        ];
        Self {
            cells,
            start: Position::new(4, 0),
            goal: Position::new(4, 6),
        }
    }
}

impl Scenario {
    /// Read a scenario from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let text = fs::read_to_string(path)?;
        let scenario = serde_json::from_str(&text)?;
        Ok(scenario)
    }

    /// Validate the scenario into a solvable problem.
    pub fn to_problem(&self) -> Result<PathProblem, GridError> {
        let grid = Grid::new(self.cells.clone())?;
        PathProblem::new(grid, self.start, self.goal)
    }
}

/// Grid and scenario validation errors.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Grid must have at least one row and one column")]
    Empty,
    #[error("Row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Cell ({row}, {col}) has invalid value {value}")]
    InvalidCost { row: usize, col: usize, value: i32 },
    #[error("Cell ({row}, {col}) has zero cost; traversable cells must cost at least 1")]
    ZeroCost { row: usize, col: usize },
    #[error("Start {0} is out of bounds or a wall")]
    StartNotTraversable(Position),
    #[error("Goal {0} is out of bounds or a wall")]
    GoalNotTraversable(Position),
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");

        let parsed: Position = serde_json::from_str("[2, 5]").unwrap();
        assert_eq!(parsed, Position::new(2, 5));
    }

    #[test]
    fn test_manhattan() {
        let a = Position::new(1, 4);
        let b = Position::new(3, 1);
        assert_eq!(a.manhattan(b), 5);
        assert!(Position::new(2, 2).is_adjacent(Position::new(2, 3)));
        assert!(!Position::new(2, 2).is_adjacent(Position::new(3, 3)));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("maze.json");

        let scenario = Scenario::default();
        fs::write(&path, serde_json::to_string_pretty(&scenario).unwrap()).unwrap();

        let loaded = Scenario::load(&path).unwrap();
        assert_eq!(loaded.cells, scenario.cells);
        assert_eq!(loaded.start, scenario.start);
        assert_eq!(loaded.goal, scenario.goal);
    }

    #[test]
    fn test_default_scenario_is_solvable() {
        let problem = Scenario::default().to_problem().unwrap();
        assert_eq!(problem.grid.rows(), 5);
        assert_eq!(crate::compute::astar(&problem).cost, 18);

        let walled = Scenario {
            start: Position::new(3, 0),
            ..Scenario::default()
        };
        assert!(matches!(
            walled.to_problem(),
            Err(GridError::StartNotTraversable(_))
        ));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"cells\": [[1, 1]], \"start\": [0] }").unwrap();

        assert!(matches!(Scenario::load(&path), Err(GridError::Parse(_))));
        assert!(matches!(
            Scenario::load(dir.path().join("missing.json")),
            Err(GridError::Io(_))
        ));
    }
}
