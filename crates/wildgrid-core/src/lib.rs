//! Deterministic tick engine for a grid ecosystem.
//!
//! A world is a rows-by-cols occupancy grid over immutable terrain,
//! populated by agents of nine species. Each call to
//! [`WorldState::step`] runs one tick: pace counters advance and select
//! the agents due to act, due agents perceive a frozen snapshot of the
//! grid, decisions commit one cardinal step each against the live grid,
//! zombies convert adjacent humans, and finally weather and the day/night
//! clock advance.
//!
//! Worlds seeded through [`WorldConfig::rng_seed`] are fully
//! reproducible: identical configuration, terrain, and placements yield
//! identical histories.

mod agent;
mod behavior;
mod clock;
mod config;
mod error;
mod grid;
mod perception;
mod species;
mod terrain;
mod weather;
mod world;

pub use agent::{Agent, AgentId, Pacer};
pub use clock::{DayCycle, DayPhase};
pub use config::WorldConfig;
pub use error::WorldError;
pub use grid::{Cell, Direction, OccupancyGrid};
pub use perception::{Perceived, SnapshotAgent, WorldSnapshot, perceive};
pub use species::{Species, SpeciesProfile, SpeciesTable};
pub use terrain::{Overlay, Terrain, TerrainCell, TileKind};
pub use weather::{Weather, WeatherConfig};
pub use world::{Census, Tick, TickEvents, TickSummary, WorldState};

pub use wildgrid_vision::{OpacityMap, SightProfile, VisionError, disc_cells, dist_sq, line_clear};
