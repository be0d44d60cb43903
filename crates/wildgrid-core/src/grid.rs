//! Grid coordinates, cardinal directions, and the shared occupancy grid.

use crate::agent::AgentId;
use crate::error::WorldError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid coordinate. Rows grow downward, columns grow rightward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn dist_sq(self, other: Self) -> i64 {
        wildgrid_vision::dist_sq(self.into(), other.into())
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub fn manhattan(self, other: Self) -> i64 {
        i64::from((self.row - other.row).abs()) + i64::from((self.col - other.col).abs())
    }

    /// The cell one step in `dir`.
    #[must_use]
    pub const fn step(self, dir: Direction) -> Self {
        let (d_row, d_col) = dir.delta();
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four cardinal movement directions.
///
/// Enumeration order is the tie-break order everywhere candidate steps are
/// ranked: equal scores resolve to the earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    /// All directions, in tie-break order.
    pub const CARDINAL: [Self; 4] = [Self::Up, Self::Down, Self::Right, Self::Left];

    /// Row and column delta of one step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Right => (0, 1),
            Self::Left => (0, -1),
        }
    }
}

/// Mutable rows-by-cols map from cell to at most one occupant.
///
/// `set` is the sole mutation primitive and performs no legality checks;
/// callers (`WorldState` placement, movement, and contagion) are
/// responsible for keeping stored agent positions and grid slots in
/// lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyGrid {
    rows: i32,
    cols: i32,
    cells: Vec<Option<AgentId>>,
}

impl OccupancyGrid {
    pub fn new(rows: i32, cols: i32) -> Result<Self, WorldError> {
        if rows <= 0 || cols <= 0 {
            return Err(WorldError::InvalidConfig(
                "grid dimensions must be positive",
            ));
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![None; (rows as usize) * (cols as usize)],
        })
    }

    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    #[must_use]
    pub const fn within_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows && cell.col >= 0 && cell.col < self.cols
    }

    fn offset(&self, cell: Cell) -> usize {
        (cell.row as usize) * (self.cols as usize) + cell.col as usize
    }

    /// Occupant of `cell`, `None` when empty or out of bounds.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<AgentId> {
        if !self.within_bounds(cell) {
            return None;
        }
        self.cells[self.offset(cell)]
    }

    /// Raw slot write. Panics out of bounds: writes land here only after the
    /// caller has already validated the target.
    pub(crate) fn set(&mut self, cell: Cell, occupant: Option<AgentId>) {
        assert!(
            self.within_bounds(cell),
            "occupancy write outside the grid at {cell}"
        );
        let idx = self.offset(cell);
        self.cells[idx] = occupant;
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn fresh_id() -> AgentId {
        let mut arena: SlotMap<AgentId, ()> = SlotMap::with_key();
        arena.insert(())
    }

    #[test]
    fn step_deltas_match_screen_orientation() {
        let origin = Cell::new(5, 5);
        assert_eq!(origin.step(Direction::Up), Cell::new(4, 5));
        assert_eq!(origin.step(Direction::Down), Cell::new(6, 5));
        assert_eq!(origin.step(Direction::Right), Cell::new(5, 6));
        assert_eq!(origin.step(Direction::Left), Cell::new(5, 4));
    }

    #[test]
    fn cardinal_order_is_the_tie_break_order() {
        assert_eq!(
            Direction::CARDINAL,
            [
                Direction::Up,
                Direction::Down,
                Direction::Right,
                Direction::Left
            ]
        );
    }

    #[test]
    fn distances_agree_on_axis_aligned_pairs() {
        let a = Cell::new(2, 3);
        let b = Cell::new(2, 7);
        assert_eq!(a.dist_sq(b), 16);
        assert_eq!(a.manhattan(b), 4);
    }

    #[test]
    fn grid_rejects_empty_dimensions() {
        assert!(OccupancyGrid::new(0, 8).is_err());
        assert!(OccupancyGrid::new(8, -1).is_err());
    }

    #[test]
    fn get_is_none_outside_the_grid() {
        let grid = OccupancyGrid::new(4, 4).unwrap();
        assert_eq!(grid.get(Cell::new(-1, 0)), None);
        assert_eq!(grid.get(Cell::new(0, 4)), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut grid = OccupancyGrid::new(4, 4).unwrap();
        let id = fresh_id();
        let cell = Cell::new(1, 2);
        grid.set(cell, Some(id));
        assert_eq!(grid.get(cell), Some(id));
        assert_eq!(grid.population(), 1);
        grid.set(cell, None);
        assert_eq!(grid.get(cell), None);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    #[should_panic(expected = "occupancy write outside the grid")]
    fn out_of_bounds_write_is_fatal() {
        let mut grid = OccupancyGrid::new(4, 4).unwrap();
        grid.set(Cell::new(4, 0), Some(fresh_id()));
    }
}
