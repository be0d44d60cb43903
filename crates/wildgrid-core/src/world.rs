//! The aggregate world state and its tick pipeline.

use crate::agent::{Agent, AgentId};
use crate::behavior::{AgentView, MovePlan, decide};
use crate::clock::{DayCycle, DayPhase};
use crate::config::WorldConfig;
use crate::error::WorldError;
use crate::grid::{Cell, Direction, OccupancyGrid};
use crate::perception::{Perceived, WorldSnapshot, perceive};
use crate::species::{Species, SpeciesProfile};
use crate::terrain::Terrain;
use crate::weather::{Weather, WeatherShift};
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::fmt;
use wildgrid_vision::SightProfile;

/// Monotonic world tick counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-species population counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Census {
    counts: [u32; Species::COUNT],
}

impl Census {
    #[must_use]
    pub const fn count(&self, species: Species) -> u32 {
        self.counts[species.index()]
    }

    pub(crate) fn record(&mut self, species: Species) {
        self.counts[species.index()] += 1;
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Counts for every species, in census order.
    pub fn iter(&self) -> impl Iterator<Item = (Species, u32)> + '_ {
        Species::ALL.iter().map(move |&species| (species, self.count(species)))
    }
}

/// Events emitted by one call to [`WorldState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvents {
    /// Value of the tick counter after the step.
    pub tick: Tick,
    /// Phase the tick ran under.
    pub phase: DayPhase,
    /// Agents that committed a move this tick.
    pub moved: usize,
    /// Humans converted to zombies this tick.
    pub infected: usize,
    /// Intensity of rain that started this tick, if any.
    pub rain_started: Option<u32>,
    pub rain_stopped: bool,
}

/// Aggregated view of one completed tick, retained in the history ring.
/// `phase` and `raining` are the conditions the tick's pacing ran under;
/// `tick` and `census` are read after its events settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub phase: DayPhase,
    pub raining: bool,
    pub census: Census,
}

/// One agent cleared to act this tick.
struct DueAgent {
    id: AgentId,
    position: Cell,
    sight: SightProfile,
}

/// The world: terrain, occupancy, agents, clock, weather, and RNG, driven
/// tick by tick through [`WorldState::step`].
pub struct WorldState {
    config: WorldConfig,
    terrain: Terrain,
    grid: OccupancyGrid,
    agents: SlotMap<AgentId, Agent>,
    rng: SmallRng,
    clock: DayCycle,
    weather: Weather,
    tick: Tick,
    history: VecDeque<TickSummary>,
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldState")
            .field("tick", &self.tick)
            .field("agents", &self.agents.len())
            .field("phase", &self.clock.phase())
            .field("raining", &self.weather.is_raining())
            .finish_non_exhaustive()
    }
}

impl WorldState {
    /// Build a world over loader-supplied terrain. The grid adopts the
    /// terrain's dimensions and starts empty.
    pub fn new(config: WorldConfig, terrain: Terrain) -> Result<Self, WorldError> {
        config.validate()?;
        let grid = OccupancyGrid::new(terrain.rows(), terrain.cols())?;
        let clock = DayCycle::new(config.ticks_per_day)?;
        let rng = config.seeded_rng();
        let history = VecDeque::with_capacity(config.history_capacity.min(1024));
        Ok(Self {
            config,
            terrain,
            grid,
            agents: SlotMap::with_key(),
            rng,
            clock,
            weather: Weather::default(),
            tick: Tick::zero(),
            history,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Mutable config access for scenario tuning between ticks. Edits skip
    /// validation; prefer building a fresh world for anything structural.
    pub fn config_mut(&mut self) -> &mut WorldConfig {
        &mut self.config
    }

    #[must_use]
    pub const fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    #[must_use]
    pub const fn clock(&self) -> &DayCycle {
        &self.clock
    }

    #[must_use]
    pub const fn weather(&self) -> &Weather {
        &self.weather
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Mutable agent access; exposes pace overrides, never position.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// All live agents in arena order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    /// Occupant of `cell`, if any.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<AgentId> {
        self.grid.get(cell)
    }

    /// Recent tick summaries, oldest first, capped at the configured
    /// history capacity.
    #[must_use]
    pub const fn history(&self) -> &VecDeque<TickSummary> {
        &self.history
    }

    #[must_use]
    pub fn latest_summary(&self) -> Option<&TickSummary> {
        self.history.back()
    }

    /// Frozen copy of the current occupancy, for rendering or analysis.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.grid, &self.agents)
    }

    /// Current per-species population counts.
    #[must_use]
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for agent in self.agents.values() {
            census.record(agent.species());
        }
        census
    }

    /// Validated spawn: the target must be in bounds, passable terrain,
    /// and vacant.
    pub fn place_agent(&mut self, species: Species, at: Cell) -> Result<AgentId, WorldError> {
        if !self.grid.within_bounds(at) {
            return Err(WorldError::OutOfBounds {
                at,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            });
        }
        if !self.terrain.passable(at) {
            return Err(WorldError::PlacementInvalid {
                at,
                reason: "cell is an obstacle",
            });
        }
        if self.grid.get(at).is_some() {
            return Err(WorldError::PlacementInvalid {
                at,
                reason: "cell is already occupied",
            });
        }
        let profile = self.config.species.profile(species);
        let agent = Agent::new(species, at, profile)?;
        let id = self.agents.insert(agent);
        self.grid.set(at, Some(id));
        Ok(id)
    }

    /// Remove an agent, clearing its grid slot. Returns the final state,
    /// or `None` for a stale id.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(id)?;
        self.grid.set(agent.position(), None);
        Some(agent)
    }

    /// Execute one tick: pace counters, snapshot perception, movement,
    /// contagion, then weather and clock, in that order.
    pub fn step(&mut self) -> TickEvents {
        let phase = self.clock.phase();
        let snapshot = self.snapshot();
        let due = self.stage_pacing(&snapshot, phase);
        let sensed = self.stage_perception(&snapshot, &due);
        let moved = self.stage_movement(&due, &sensed);
        let infected = self.stage_contagion();
        let raining = self.weather.is_raining();
        let shift = self.weather.advance(&self.config.weather, &mut self.rng);
        self.clock.advance();
        self.tick = self.tick.next();
        self.push_summary(phase, raining);
        debug_assert!(
            self.coherent(),
            "agent positions and occupancy slots diverged at tick {}",
            self.tick
        );
        TickEvents {
            tick: self.tick,
            phase,
            moved,
            infected,
            rain_started: match shift {
                WeatherShift::Started(intensity) => Some(intensity),
                _ => None,
            },
            rain_stopped: shift == WeatherShift::Stopped,
        }
    }

    /// Advance every agent's pace counter and collect those due to act, in
    /// row-major grid order.
    fn stage_pacing(&mut self, snapshot: &WorldSnapshot, phase: DayPhase) -> Vec<DueAgent> {
        let rain_penalty = self.weather.pace_penalty();
        let mut due = Vec::new();
        for snap in snapshot.iter_agents() {
            let Some(agent) = self.agents.get_mut(snap.id) else {
                continue;
            };
            let profile = self.config.species.profile(snap.species);
            let threshold = effective_threshold(agent.pace().speed(), profile, phase, rain_penalty);
            if agent.pace_mut().advance(threshold) {
                if agent.food() > 0 {
                    agent.digest();
                }
                due.push(DueAgent {
                    id: snap.id,
                    position: snap.position,
                    sight: profile.sight,
                });
            }
        }
        due
    }

    /// Compute perception for every due agent against the frozen snapshot.
    /// Queries are independent, so they fan out across threads.
    fn stage_perception(&self, snapshot: &WorldSnapshot, due: &[DueAgent]) -> Vec<Vec<Perceived>> {
        due.par_iter()
            .map(|d| perceive(snapshot, &self.terrain, d.position, d.id, d.sight))
            .collect()
    }

    /// Decide and commit movement for each due agent in order. Decisions
    /// read the snapshot; commits check the live grid.
    fn stage_movement(&mut self, due: &[DueAgent], sensed: &[Vec<Perceived>]) -> usize {
        debug_assert_eq!(due.len(), sensed.len());
        let mut moved = 0;
        for (d, perceived) in due.iter().zip(sensed) {
            let Some(agent) = self.agents.get(d.id) else {
                continue;
            };
            let view = AgentView {
                species: agent.species(),
                position: agent.position(),
                home: agent.home(),
            };
            let plan = decide(view, perceived, &self.config.species, &mut self.rng);
            if let MovePlan::Try(dirs) = plan {
                for dir in dirs {
                    if self.try_move(d.id, dir) {
                        moved += 1;
                        break;
                    }
                }
            }
        }
        moved
    }

    /// Attempt one cardinal step. A step commits only when the target is
    /// in bounds, passable terrain, and vacant on the live grid; the grid
    /// slot and the stored position move together.
    fn try_move(&mut self, id: AgentId, dir: Direction) -> bool {
        let Some(from) = self.agents.get(id).map(Agent::position) else {
            return false;
        };
        let target = from.step(dir);
        if !self.grid.within_bounds(target)
            || !self.terrain.passable(target)
            || self.grid.get(target).is_some()
        {
            return false;
        }
        self.grid.set(from, None);
        self.grid.set(target, Some(id));
        self.agents[id].relocate(target);
        true
    }

    /// Post-move contagion sweep. Scans the live grid row-major; every
    /// zombie converts orthogonally adjacent humans in place. Because the
    /// scan reads the live grid, a convert ahead of the cursor is itself
    /// scanned later this same tick and conversions chain.
    fn stage_contagion(&mut self) -> usize {
        let mut infected = 0;
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let here = Cell::new(row, col);
                let Some(id) = self.grid.get(here) else {
                    continue;
                };
                if self.agents[id].species() != Species::Zombie {
                    continue;
                }
                for dir in Direction::CARDINAL {
                    let side = here.step(dir);
                    let Some(victim) = self.grid.get(side) else {
                        continue;
                    };
                    if self.agents[victim].species() == Species::Human
                        && self.convert_to_zombie(victim, side)
                    {
                        infected += 1;
                    }
                }
            }
        }
        infected
    }

    /// Swap a human out for a fresh zombie on the same cell.
    fn convert_to_zombie(&mut self, victim: AgentId, at: Cell) -> bool {
        let profile = self.config.species.profile(Species::Zombie);
        let Ok(zombie) = Agent::new(Species::Zombie, at, profile) else {
            // Unreachable with a validated table; leave the human standing
            // rather than vacate the cell.
            return false;
        };
        self.agents.remove(victim);
        let id = self.agents.insert(zombie);
        self.grid.set(at, Some(id));
        true
    }

    fn push_summary(&mut self, phase: DayPhase, raining: bool) {
        let summary = TickSummary {
            tick: self.tick,
            phase,
            raining,
            census: self.census(),
        };
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    /// Diagnostic: every occupied slot points at a live agent standing on
    /// that exact cell, and no agent lacks a slot.
    #[must_use]
    pub fn coherent(&self) -> bool {
        let mut occupied = 0usize;
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let cell = Cell::new(row, col);
                let Some(id) = self.grid.get(cell) else {
                    continue;
                };
                occupied += 1;
                match self.agents.get(id) {
                    Some(agent) if agent.position() == cell => {}
                    _ => return false,
                }
            }
        }
        occupied == self.agents.len()
    }
}

/// Ticks-per-act after day-phase and weather modifiers: the night factor
/// scales the base speed (rounded to nearest, floored at 1), then the rain
/// penalty adds flat ticks.
fn effective_threshold(
    base: u32,
    profile: &SpeciesProfile,
    phase: DayPhase,
    rain_penalty: u32,
) -> u32 {
    let factored = if phase == DayPhase::Night {
        (base as f32 * profile.night_factor).round() as u32
    } else {
        base
    };
    factored.max(1) + rain_penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesTable;
    use crate::terrain::{TerrainCell, TileKind};
    use crate::weather::WeatherConfig;

    fn test_world(rows: i32, cols: i32) -> WorldState {
        let config = WorldConfig {
            rng_seed: Some(0xC0FFEE),
            weather: WeatherConfig {
                start_chance: 0.0,
                ..WeatherConfig::default()
            },
            ..WorldConfig::default()
        };
        WorldState::new(config, Terrain::open(rows, cols).unwrap()).unwrap()
    }

    fn human_profile() -> SpeciesProfile {
        *SpeciesTable::default().profile(Species::Human)
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = WorldConfig::default();
        config.species.profile_mut(Species::Bunny).speed = 0;
        let err = WorldState::new(config, Terrain::open(4, 4).unwrap()).unwrap_err();
        assert_eq!(err, WorldError::InvalidSpeed { requested: 0 });
    }

    #[test]
    fn placement_rejects_out_of_bounds_targets() {
        let mut world = test_world(4, 4);
        let err = world.place_agent(Species::Deer, Cell::new(4, 0)).unwrap_err();
        assert_eq!(
            err,
            WorldError::OutOfBounds {
                at: Cell::new(4, 0),
                rows: 4,
                cols: 4
            }
        );
    }

    #[test]
    fn placement_rejects_obstacles_and_occupied_cells() {
        let mut cells = vec![TerrainCell::default(); 16];
        cells[0] = TerrainCell::open(TileKind::Water);
        let terrain = Terrain::from_cells(4, 4, cells).unwrap();
        let mut world = WorldState::new(WorldConfig::default(), terrain).unwrap();

        assert_eq!(
            world.place_agent(Species::Boar, Cell::new(0, 0)),
            Err(WorldError::PlacementInvalid {
                at: Cell::new(0, 0),
                reason: "cell is an obstacle"
            })
        );

        world.place_agent(Species::Boar, Cell::new(1, 1)).unwrap();
        assert_eq!(
            world.place_agent(Species::Fox, Cell::new(1, 1)),
            Err(WorldError::PlacementInvalid {
                at: Cell::new(1, 1),
                reason: "cell is already occupied"
            })
        );
    }

    #[test]
    fn placement_and_removal_keep_the_world_coherent() {
        let mut world = test_world(6, 6);
        let id = world.place_agent(Species::Wolf, Cell::new(2, 3)).unwrap();
        assert_eq!(world.occupant(Cell::new(2, 3)), Some(id));
        assert_eq!(world.agent(id).map(Agent::position), Some(Cell::new(2, 3)));
        assert_eq!(world.agent(id).map(Agent::species), Some(Species::Wolf));
        assert!(world.coherent());

        let gone = world.remove_agent(id).unwrap();
        assert_eq!(gone.position(), Cell::new(2, 3));
        assert_eq!(world.occupant(Cell::new(2, 3)), None);
        assert_eq!(world.agent_count(), 0);
        assert!(world.coherent());
        assert!(world.remove_agent(id).is_none());
    }

    #[test]
    fn night_scales_thresholds_and_rain_adds_flat_ticks() {
        let human = human_profile();
        assert_eq!(effective_threshold(2, &human, DayPhase::Day, 0), 2);
        assert_eq!(effective_threshold(2, &human, DayPhase::Night, 0), 3);
        assert_eq!(effective_threshold(2, &human, DayPhase::Night, 3), 6);

        let zombie = *SpeciesTable::default().profile(Species::Zombie);
        assert_eq!(effective_threshold(3, &zombie, DayPhase::Day, 0), 3);
        // 3 * 0.75 rounds to 2: zombies speed up after dark.
        assert_eq!(effective_threshold(3, &zombie, DayPhase::Night, 0), 2);
    }

    #[test]
    fn threshold_never_drops_below_one() {
        let mut profile = human_profile();
        profile.night_factor = 0.1;
        assert_eq!(effective_threshold(1, &profile, DayPhase::Night, 0), 1);
    }

    #[test]
    fn a_zombie_converts_its_neighbor_in_place() {
        let mut world = test_world(6, 6);
        world.place_agent(Species::Zombie, Cell::new(2, 2)).unwrap();
        let human = world.place_agent(Species::Human, Cell::new(2, 3)).unwrap();

        let infected = world.stage_contagion();
        assert_eq!(infected, 1);
        assert!(world.agent(human).is_none());
        let convert = world.occupant(Cell::new(2, 3)).unwrap();
        assert_eq!(world.agent(convert).unwrap().species(), Species::Zombie);
        assert!(world.coherent());
    }

    #[test]
    fn contagion_needs_orthogonal_adjacency() {
        let mut world = test_world(6, 6);
        world.place_agent(Species::Zombie, Cell::new(2, 2)).unwrap();
        let diagonal = world.place_agent(Species::Human, Cell::new(3, 3)).unwrap();
        let far = world.place_agent(Species::Human, Cell::new(2, 5)).unwrap();

        assert_eq!(world.stage_contagion(), 0);
        assert_eq!(world.agent(diagonal).unwrap().species(), Species::Human);
        assert_eq!(world.agent(far).unwrap().species(), Species::Human);
    }

    #[test]
    fn due_agents_digest_once_per_act() {
        let mut world = test_world(6, 6);
        let id = world.place_agent(Species::Pig, Cell::new(3, 3)).unwrap();
        let start = world.agent(id).unwrap().food();
        assert!(start > 0);

        // Pigs act every 3 ticks; food burns only on acting ticks.
        for _ in 0..3 {
            world.step();
        }
        assert_eq!(world.agent(id).unwrap().food(), start - 1);
        for _ in 0..3 {
            world.step();
        }
        assert_eq!(world.agent(id).unwrap().food(), start - 2);
    }

    #[test]
    fn the_history_ring_respects_its_capacity() {
        let mut world = WorldState::new(
            WorldConfig {
                rng_seed: Some(1),
                history_capacity: 4,
                ..WorldConfig::default()
            },
            Terrain::open(4, 4).unwrap(),
        )
        .unwrap();
        for _ in 0..10 {
            world.step();
        }
        assert_eq!(world.history().len(), 4);
        assert_eq!(world.history().front().unwrap().tick, Tick(7));
        assert_eq!(world.latest_summary().unwrap().tick, Tick(10));
        assert_eq!(world.tick(), Tick(10));
    }

    #[test]
    fn summaries_record_the_conditions_the_tick_ran_under() {
        let mut world = WorldState::new(
            WorldConfig {
                rng_seed: Some(77),
                ticks_per_day: 10,
                weather: WeatherConfig {
                    start_chance: 1.0,
                    stop_chance: 0.0,
                    ..WeatherConfig::default()
                },
                ..WorldConfig::default()
            },
            Terrain::open(4, 4).unwrap(),
        )
        .unwrap();

        // Rain starts and the clock leaves dawn only after the first
        // tick's pacing already ran; its summary keeps the dry dawn
        // reading.
        let events = world.step();
        assert!(events.rain_started.is_some());
        let first = *world.latest_summary().unwrap();
        assert_eq!(first.phase, DayPhase::Dawn);
        assert!(!first.raining);
        assert!(world.weather().is_raining());
        assert_eq!(world.clock().phase(), DayPhase::Day);

        world.step();
        let second = *world.latest_summary().unwrap();
        assert_eq!(second.phase, DayPhase::Day);
        assert!(second.raining);
    }
}
