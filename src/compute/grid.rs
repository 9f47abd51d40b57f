//! Immutable weighted grid model shared by every solver.

use crate::schema::{GridError, Position, WALL};

/// One of the four grid moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row/column delta of this move.
    #[inline]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Rectangular grid of traversal costs.
///
/// Walls are stored as `None`. Traversable cells always cost at least 1, which
/// keeps the Manhattan heuristic admissible.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<u32>>,
}

impl Grid {
    /// Build a grid from a row-major matrix using `-1` as the wall sentinel.
    pub fn new(cells: Vec<Vec<i32>>) -> Result<Self, GridError> {
        let rows = cells.len();
        let cols = cells.first().map(|r| r.len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }

        let mut flat = Vec::with_capacity(rows * cols);
        for (row, values) in cells.iter().enumerate() {
            if values.len() != cols {
                return Err(GridError::Ragged {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                let cell = match value {
                    WALL => None,
                    0 => return Err(GridError::ZeroCost { row, col }),
                    v if v < 0 => return Err(GridError::InvalidCost { row, col, value }),
                    v => Some(v as u32),
                };
                flat.push(cell);
            }
        }

        Ok(Self {
            rows,
            cols,
            cells: flat,
        })
    }

    /// Grid with every cell costing `cost`.
    pub fn uniform(rows: usize, cols: usize, cost: i32) -> Result<Self, GridError> {
        Self::new(vec![vec![cost; cols]; rows])
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    #[inline]
    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Flat row-major index. Caller must ensure `pos` is in bounds.
    #[inline]
    pub fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn position(&self, index: usize) -> Position {
        Position::new(index / self.cols, index % self.cols)
    }

    /// In bounds and not a wall.
    #[inline]
    pub fn is_traversable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)].is_some()
    }

    /// Cost of entering `pos`, or `None` for walls and out-of-bounds cells.
    #[inline]
    pub fn cost(&self, pos: Position) -> Option<u32> {
        if self.in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            None
        }
    }

    /// The in-bounds neighbour of `pos` in direction `dir`.
    #[inline]
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.in_bounds(next).then_some(next)
    }

    /// Traversable neighbours of `pos` in canonical direction order.
    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.neighbor(pos, dir))
            .filter(|&next| self.is_traversable(next))
    }

    /// Cost of walking `path`, excluding its first cell.
    ///
    /// Returns `None` if the path is empty, steps onto a wall or makes a
    /// non-adjacent jump.
    pub fn path_cost(&self, path: &[Position]) -> Option<u64> {
        let first = *path.first()?;
        if !self.is_traversable(first) {
            return None;
        }

        let mut total = 0u64;
        for pair in path.windows(2) {
            if !pair[0].is_adjacent(pair[1]) {
                return None;
            }
            total += self.cost(pair[1])? as u64;
        }
        Some(total)
    }
}

/// A validated grid with traversable start and goal cells.
#[derive(Debug, Clone)]
pub struct PathProblem {
    pub grid: Grid,
    pub start: Position,
    pub goal: Position,
}

impl PathProblem {
    /// Validate start and goal against the grid.
    pub fn new(grid: Grid, start: Position, goal: Position) -> Result<Self, GridError> {
        if !grid.is_traversable(start) {
            return Err(GridError::StartNotTraversable(start));
        }
        if !grid.is_traversable(goal) {
            return Err(GridError::GoalNotTraversable(goal));
        }
        Ok(Self { grid, start, goal })
    }
}
