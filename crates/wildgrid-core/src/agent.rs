//! Agent state: identity, position, pacing, and per-agent counters.

use crate::error::WorldError;
use crate::grid::Cell;
use crate::species::{Species, SpeciesProfile};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle for an agent, backed by a generational slot map.
    pub struct AgentId;
}

/// Speed-accumulator scheduler state for one agent.
///
/// Every tick the counter rises by one; when it reaches the effective
/// threshold the agent acts and the counter resets to zero. Larger
/// thresholds therefore mean slower agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacer {
    speed: u32,
    counter: u32,
}

impl Pacer {
    pub fn new(speed: u32) -> Result<Self, WorldError> {
        if speed == 0 {
            return Err(WorldError::InvalidSpeed { requested: 0 });
        }
        Ok(Self { speed, counter: 0 })
    }

    /// Base ticks-per-act before phase and weather modifiers.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    #[must_use]
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Replace the base speed. The accumulated counter is preserved, so a
    /// newly hastened agent may act on the very next tick.
    pub fn set_speed(&mut self, speed: i64) -> Result<(), WorldError> {
        if speed < 1 {
            return Err(WorldError::InvalidSpeed { requested: speed });
        }
        self.speed = u32::try_from(speed).unwrap_or(u32::MAX);
        Ok(())
    }

    /// Advance one tick against `threshold`, reporting whether the agent
    /// acts now. Thresholds below 1 are treated as 1.
    pub(crate) fn advance(&mut self, threshold: u32) -> bool {
        self.counter += 1;
        if self.counter >= threshold.max(1) {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

/// One simulated entity.
///
/// Position updates flow exclusively through the world's occupancy-commit
/// protocol, which keeps the stored cell and the grid slot in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    species: Species,
    position: Cell,
    pace: Pacer,
    food: i32,
    home: Option<Cell>,
}

impl Agent {
    pub(crate) fn new(
        species: Species,
        position: Cell,
        profile: &SpeciesProfile,
    ) -> Result<Self, WorldError> {
        Ok(Self {
            species,
            position,
            pace: Pacer::new(profile.speed)?,
            food: profile.food,
            home: (profile.home_bias > 0.0).then_some(position),
        })
    }

    #[must_use]
    pub const fn species(&self) -> Species {
        self.species
    }

    #[must_use]
    pub const fn position(&self) -> Cell {
        self.position
    }

    /// Remaining food counter; `0` either means hungry or that the species
    /// does not track food at all.
    #[must_use]
    pub const fn food(&self) -> i32 {
        self.food
    }

    /// Spawn anchor for territorial species.
    #[must_use]
    pub const fn home(&self) -> Option<Cell> {
        self.home
    }

    #[must_use]
    pub const fn pace(&self) -> &Pacer {
        &self.pace
    }

    /// Override the base ticks-per-act for this agent.
    pub fn set_speed(&mut self, speed: i64) -> Result<(), WorldError> {
        self.pace.set_speed(speed)
    }

    pub(crate) fn pace_mut(&mut self) -> &mut Pacer {
        &mut self.pace
    }

    /// Move the stored position. Caller owns the matching grid update.
    pub(crate) fn relocate(&mut self, cell: Cell) {
        self.position = cell;
    }

    /// Burn one unit of food, clamped at zero.
    pub(crate) fn digest(&mut self) {
        self.food = (self.food - 1).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesTable;

    #[test]
    fn pacer_fires_every_speed_ticks() {
        let mut pacer = Pacer::new(5).unwrap();
        let fired: Vec<bool> = (0..11).map(|_| pacer.advance(5)).collect();
        assert_eq!(
            fired,
            [false, false, false, false, true, false, false, false, false, true, false]
        );
        assert_eq!(pacer.counter(), 1);
    }

    #[test]
    fn speed_one_acts_every_tick() {
        let mut pacer = Pacer::new(1).unwrap();
        assert!((0..5).all(|_| pacer.advance(1)));
    }

    #[test]
    fn non_positive_speeds_are_rejected() {
        assert_eq!(
            Pacer::new(0),
            Err(WorldError::InvalidSpeed { requested: 0 })
        );
        let mut pacer = Pacer::new(2).unwrap();
        assert_eq!(
            pacer.set_speed(0),
            Err(WorldError::InvalidSpeed { requested: 0 })
        );
        assert_eq!(
            pacer.set_speed(-4),
            Err(WorldError::InvalidSpeed { requested: -4 })
        );
        assert_eq!(pacer.speed(), 2);
        assert_eq!(pacer.set_speed(5), Ok(()));
        assert_eq!(pacer.speed(), 5);
    }

    #[test]
    fn set_speed_keeps_the_accumulated_counter() {
        let mut pacer = Pacer::new(4).unwrap();
        pacer.advance(4);
        pacer.advance(4);
        assert_eq!(pacer.counter(), 2);
        pacer.set_speed(1).unwrap();
        assert!(pacer.advance(1));
    }

    #[test]
    fn only_biased_species_anchor_a_home() {
        let table = SpeciesTable::default();
        let cell = Cell::new(3, 4);
        let bear = Agent::new(Species::Bear, cell, table.profile(Species::Bear)).unwrap();
        assert_eq!(bear.home(), Some(cell));
        let wolf = Agent::new(Species::Wolf, cell, table.profile(Species::Wolf)).unwrap();
        assert_eq!(wolf.home(), None);
    }

    #[test]
    fn digest_floors_at_zero() {
        let table = SpeciesTable::default();
        let mut pig = Agent::new(Species::Pig, Cell::new(0, 0), table.profile(Species::Pig)).unwrap();
        for _ in 0..20 {
            pig.digest();
        }
        assert_eq!(pig.food(), 0);
    }
}
