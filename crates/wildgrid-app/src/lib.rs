//! Headless runner plumbing: terrain generation, population seeding, and
//! the tick loop.

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use wildgrid_core::{
    Cell, Direction, Overlay, Species, Terrain, TerrainCell, TickEvents, TileKind, WorldConfig,
    WorldError, WorldState, disc_cells,
};

/// Random draws per agent before the seeder gives up on a spawn.
const PLACEMENT_ATTEMPTS: u32 = 32;

/// A runnable scenario: world configuration plus spawn counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Scenario {
    pub world: WorldConfig,
    pub spawn: SpawnPlan,
}

impl Scenario {
    /// Load and validate a scenario from a JSON file. Missing fields fall
    /// back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        scenario
            .world
            .validate()
            .context("invalid scenario configuration")?;
        Ok(scenario)
    }
}

/// How many agents of each species the seeder attempts to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPlan {
    pub humans: u32,
    pub zombies: u32,
    pub deer: u32,
    pub bears: u32,
    pub boars: u32,
    pub foxes: u32,
    pub wolves: u32,
    pub bunnies: u32,
    pub pigs: u32,
}

impl Default for SpawnPlan {
    fn default() -> Self {
        Self {
            humans: 12,
            zombies: 4,
            deer: 10,
            bears: 3,
            boars: 6,
            foxes: 4,
            wolves: 3,
            bunnies: 10,
            pigs: 4,
        }
    }
}

impl SpawnPlan {
    /// Planned (species, count) pairs in placement order.
    pub fn iter(&self) -> impl Iterator<Item = (Species, u32)> {
        [
            (Species::Human, self.humans),
            (Species::Zombie, self.zombies),
            (Species::Deer, self.deer),
            (Species::Bear, self.bears),
            (Species::Boar, self.boars),
            (Species::Fox, self.foxes),
            (Species::Wolf, self.wolves),
            (Species::Bunny, self.bunnies),
            (Species::Pig, self.pigs),
        ]
        .into_iter()
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.iter().map(|(_, count)| count).sum()
    }
}

/// Roll a woodland map: grass baseline, dirt meadows, ponds with sandy
/// shores and the odd lily pad, rock ridges, then scattered trees and
/// brush.
pub fn generate_terrain(rows: i32, cols: i32, rng: &mut SmallRng) -> Result<Terrain> {
    if rows <= 0 || cols <= 0 {
        bail!("terrain dimensions must be positive, got {rows}x{cols}");
    }
    let area = (rows as usize) * (cols as usize);
    let mut cells = vec![TerrainCell::default(); area];
    let idx = |cell: Cell| (cell.row as usize) * (cols as usize) + cell.col as usize;
    let in_bounds =
        |cell: Cell| cell.row >= 0 && cell.row < rows && cell.col >= 0 && cell.col < cols;

    // Dirt meadows, purely cosmetic.
    for _ in 0..(area / 120).max(1) {
        let center = random_cell(rows, cols, rng);
        let radius = rng.random_range(2..=4);
        for ((row, col), _) in disc_cells((center.row, center.col), radius) {
            let cell = Cell::new(row, col);
            if in_bounds(cell) {
                cells[idx(cell)] = TerrainCell::open(TileKind::Dirt);
            }
        }
    }

    // Ponds.
    for _ in 0..(area / 160).max(1) {
        let center = random_cell(rows, cols, rng);
        let radius = rng.random_range(1..=3);
        for ((row, col), _) in disc_cells((center.row, center.col), radius) {
            let cell = Cell::new(row, col);
            if in_bounds(cell) {
                cells[idx(cell)] = TerrainCell::open(TileKind::Water);
            }
        }
    }

    // Sandy shorelines, two passes so the reads see only original water.
    let mut shoreline = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let cell = Cell::new(row, col);
            if cells[idx(cell)].kind == TileKind::Water {
                continue;
            }
            let beside_water = Direction::CARDINAL.iter().any(|&dir| {
                let near = cell.step(dir);
                in_bounds(near) && cells[idx(near)].kind == TileKind::Water
            });
            if beside_water && rng.random_bool(0.6) {
                shoreline.push(cell);
            }
        }
    }
    for cell in shoreline {
        cells[idx(cell)] = TerrainCell::open(TileKind::Sand);
    }

    // Rock ridges as short drunken walks.
    for _ in 0..(area / 200).max(1) {
        let mut cursor = random_cell(rows, cols, rng);
        for _ in 0..rng.random_range(3..=7) {
            if in_bounds(cursor) {
                cells[idx(cursor)] = TerrainCell::open(TileKind::Rock);
            }
            let dir = Direction::CARDINAL[rng.random_range(0..Direction::CARDINAL.len())];
            cursor = cursor.step(dir);
        }
    }

    // Overlays last: lily pads on water, trees and brush on open ground.
    for slot in cells.iter_mut() {
        match slot.kind {
            TileKind::Water => {
                if rng.random_bool(0.10) {
                    *slot = TerrainCell::with_overlay(TileKind::Water, Overlay::LilyPad);
                }
            }
            TileKind::Rock => {}
            kind => {
                if rng.random_bool(0.06) {
                    *slot = TerrainCell::with_overlay(kind, Overlay::Tree);
                } else if rng.random_bool(0.03) {
                    *slot = TerrainCell::with_overlay(kind, Overlay::Brush);
                }
            }
        }
    }

    Ok(Terrain::from_cells(rows, cols, cells)?)
}

fn random_cell(rows: i32, cols: i32, rng: &mut SmallRng) -> Cell {
    Cell::new(rng.random_range(0..rows), rng.random_range(0..cols))
}

/// Place the planned population on open cells, skipping any agent that
/// cannot find room within its attempt budget. Returns how many landed.
pub fn seed_population(world: &mut WorldState, plan: &SpawnPlan, rng: &mut SmallRng) -> u32 {
    let mut placed = 0;
    for (species, count) in plan.iter() {
        for _ in 0..count {
            if try_place(world, species, rng) {
                placed += 1;
            }
        }
    }
    info!(placed, planned = plan.total(), "seeded population");
    placed
}

fn try_place(world: &mut WorldState, species: Species, rng: &mut SmallRng) -> bool {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let at = random_cell(world.terrain().rows(), world.terrain().cols(), rng);
        match world.place_agent(species, at) {
            Ok(_) => return true,
            Err(WorldError::PlacementInvalid { .. }) => {}
            Err(err) => {
                warn!(%err, species = species.name(), "unexpected placement failure");
                return false;
            }
        }
    }
    warn!(
        species = species.name(),
        attempts = PLACEMENT_ATTEMPTS,
        "no open cell found; skipping spawn"
    );
    false
}

/// Totals accumulated over one headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub ticks: u64,
    pub moves: usize,
    pub infections: usize,
    pub rain_spells: u32,
}

/// Drive the world for `ticks`, logging a census line every `log_every`
/// ticks (`0` disables).
pub fn run(world: &mut WorldState, ticks: u64, log_every: u64) -> RunReport {
    let mut report = RunReport {
        ticks,
        moves: 0,
        infections: 0,
        rain_spells: 0,
    };
    for _ in 0..ticks {
        let events = world.step();
        report.moves += events.moved;
        report.infections += events.infected;
        if let Some(intensity) = events.rain_started {
            report.rain_spells += 1;
            debug!(tick = events.tick.0, intensity, "rain started");
        }
        if events.rain_stopped {
            debug!(tick = events.tick.0, "rain stopped");
        }
        if log_every > 0 && events.tick.0 % log_every == 0 {
            log_census(world, events);
        }
    }
    report
}

fn log_census(world: &WorldState, events: TickEvents) {
    let census = world.census();
    let breakdown = census
        .iter()
        .map(|(species, count)| format!("{}:{count}", species.name()))
        .collect::<Vec<_>>()
        .join(" ");
    info!(
        tick = events.tick.0,
        phase = ?events.phase,
        raining = world.weather().is_raining(),
        total = census.total(),
        %breakdown,
        "census"
    );
}
