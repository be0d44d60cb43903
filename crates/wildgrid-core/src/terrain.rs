//! Static terrain: base tiles, overlay elements, and passability rules.

use crate::error::WorldError;
use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use wildgrid_vision::OpacityMap;

/// Base classification of a terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Grass,
    Dirt,
    Sand,
    Water,
    Rock,
}

/// An element layered over a base tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Overlay {
    Tree,
    Boulder,
    Brush,
    LilyPad,
}

/// One immutable terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainCell {
    pub kind: TileKind,
    pub overlay: Option<Overlay>,
}

impl TerrainCell {
    #[must_use]
    pub const fn open(kind: TileKind) -> Self {
        Self {
            kind,
            overlay: None,
        }
    }

    #[must_use]
    pub const fn with_overlay(kind: TileKind, overlay: Overlay) -> Self {
        Self {
            kind,
            overlay: Some(overlay),
        }
    }

    /// Whether the cell counts as an obstacle. Sight lines consult only
    /// this flag.
    #[must_use]
    pub const fn is_obstacle(&self) -> bool {
        matches!(self.kind, TileKind::Water | TileKind::Rock) || self.overlay.is_some()
    }

    /// Per-element override allowing movement across an obstacle cell
    /// (brush can be pushed through, lily pads stepped on). Never consulted
    /// by sight lines.
    #[must_use]
    pub const fn can_pass_obstacle(&self) -> bool {
        matches!(self.overlay, Some(Overlay::Brush | Overlay::LilyPad))
    }

    /// Whether an agent may stand on this cell.
    #[must_use]
    pub const fn passable(&self) -> bool {
        !self.is_obstacle() || self.can_pass_obstacle()
    }
}

impl Default for TerrainCell {
    fn default() -> Self {
        Self::open(TileKind::Grass)
    }
}

/// Immutable rows-by-cols terrain map, consumed read-only by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    rows: i32,
    cols: i32,
    cells: Vec<TerrainCell>,
}

impl Terrain {
    /// Build from loader-supplied cells in row-major order.
    pub fn from_cells(rows: i32, cols: i32, cells: Vec<TerrainCell>) -> Result<Self, WorldError> {
        if rows <= 0 || cols <= 0 {
            return Err(WorldError::InvalidConfig(
                "terrain dimensions must be positive",
            ));
        }
        if cells.len() != (rows as usize) * (cols as usize) {
            return Err(WorldError::InvalidConfig(
                "terrain cell count must equal rows * cols",
            ));
        }
        Ok(Self { rows, cols, cells })
    }

    /// An all-grass map with no obstacles.
    pub fn open(rows: i32, cols: i32) -> Result<Self, WorldError> {
        if rows <= 0 || cols <= 0 {
            return Err(WorldError::InvalidConfig(
                "terrain dimensions must be positive",
            ));
        }
        let cells = vec![TerrainCell::default(); (rows as usize) * (cols as usize)];
        Self::from_cells(rows, cols, cells)
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

    /// Cell lookup, `None` out of bounds.
    #[must_use]
    pub fn cell(&self, cell: Cell) -> Option<TerrainCell> {
        if !self.within_bounds(cell) {
            return None;
        }
        Some(self.cells[(cell.row as usize) * (self.cols as usize) + cell.col as usize])
    }

    /// Movement legality of the terrain alone; out of bounds is impassable.
    #[must_use]
    pub fn passable(&self, cell: Cell) -> bool {
        self.cell(cell).is_some_and(|c| c.passable())
    }
}

impl OpacityMap for Terrain {
    fn blocks_sight(&self, row: i32, col: i32) -> bool {
        self.cell(Cell::new(row, col))
            .is_none_or(|c| c.is_obstacle())
    }
}
