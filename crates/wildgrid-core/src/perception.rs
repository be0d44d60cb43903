//! Snapshot-consistent perception queries.
//!
//! Every agent deciding within one tick perceives the same frozen picture
//! of the world, captured before movement begins. Commits still land on
//! the live grid, so perception lags at most one tick behind collisions.

use crate::agent::{Agent, AgentId};
use crate::grid::{Cell, OccupancyGrid};
use crate::species::Species;
use crate::terrain::Terrain;
use slotmap::SlotMap;
use wildgrid_vision::{SightProfile, disc_cells, line_clear};

/// Frozen view of one occupied cell at tick start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotAgent {
    pub id: AgentId,
    pub species: Species,
    pub position: Cell,
}

/// Immutable copy of the occupancy grid taken at tick start.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    rows: i32,
    cols: i32,
    cells: Vec<Option<SnapshotAgent>>,
}

impl WorldSnapshot {
    pub(crate) fn capture(grid: &OccupancyGrid, agents: &SlotMap<AgentId, Agent>) -> Self {
        let rows = grid.rows();
        let cols = grid.cols();
        let mut cells = vec![None; (rows as usize) * (cols as usize)];
        for row in 0..rows {
            for col in 0..cols {
                let cell = Cell::new(row, col);
                if let Some(id) = grid.get(cell) {
                    let agent = &agents[id];
                    cells[(row as usize) * (cols as usize) + col as usize] = Some(SnapshotAgent {
                        id,
                        species: agent.species(),
                        position: agent.position(),
                    });
                }
            }
        }
        Self { rows, cols, cells }
    }

    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Snapshot occupant of `cell`, `None` when empty or out of bounds.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<SnapshotAgent> {
        if cell.row < 0 || cell.row >= self.rows || cell.col < 0 || cell.col >= self.cols {
            return None;
        }
        self.cells[(cell.row as usize) * (self.cols as usize) + cell.col as usize]
    }

    /// All captured agents in row-major order.
    pub(crate) fn iter_agents(&self) -> impl Iterator<Item = SnapshotAgent> + '_ {
        self.cells.iter().filter_map(|slot| *slot)
    }
}

/// One neighbor visible to a perceiving agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perceived {
    pub id: AgentId,
    pub species: Species,
    pub position: Cell,
    /// Squared Euclidean distance from the perceiver.
    pub dist_sq: i64,
}

/// Every agent visible from `origin` under `sight`, excluding the observer.
///
/// Candidates come from a row-major scan of the bounding square clipped to
/// the Euclidean radius, then pass a terrain sight-line check unless they
/// fall inside the certain-detection range. The row-major result order is
/// part of the contract.
#[must_use]
pub fn perceive(
    snapshot: &WorldSnapshot,
    terrain: &Terrain,
    origin: Cell,
    observer: AgentId,
    sight: SightProfile,
) -> Vec<Perceived> {
    let mut seen = Vec::new();
    for ((row, col), dist_sq) in disc_cells(origin.into(), sight.radius) {
        let Some(found) = snapshot.get(Cell::new(row, col)) else {
            continue;
        };
        if found.id == observer {
            continue;
        }
        if !line_clear(
            terrain,
            origin.into(),
            found.position.into(),
            sight.certain_range,
        ) {
            continue;
        }
        seen.push(Perceived {
            id: found.id,
            species: found.species,
            position: found.position,
            dist_sq,
        });
    }
    seen
}
