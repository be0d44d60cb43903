//! Species tags and the data-driven profile table that parameterizes them.

use crate::error::WorldError;
use serde::{Deserialize, Serialize};
use wildgrid_vision::SightProfile;

/// Every simulated species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Human,
    Zombie,
    Deer,
    Bear,
    Boar,
    Fox,
    Wolf,
    Bunny,
    Pig,
}

impl Species {
    pub const COUNT: usize = 9;

    /// All species, in census order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Human,
        Self::Zombie,
        Self::Deer,
        Self::Bear,
        Self::Boar,
        Self::Fox,
        Self::Wolf,
        Self::Bunny,
        Self::Pig,
    ];

    /// Stable index into per-species arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Zombie => "zombie",
            Self::Deer => "deer",
            Self::Bear => "bear",
            Self::Boar => "boar",
            Self::Fox => "fox",
            Self::Wolf => "wolf",
            Self::Bunny => "bunny",
            Self::Pig => "pig",
        }
    }

    /// Whether this species is a threat to `prey`. Prey decide what to run
    /// from by asking every perceived neighbor this question.
    #[must_use]
    pub const fn menaces(self, prey: Self) -> bool {
        match self {
            Self::Zombie => matches!(prey, Self::Human),
            Self::Wolf => matches!(prey, Self::Bunny | Self::Deer | Self::Bear),
            Self::Fox => matches!(prey, Self::Bunny),
            _ => false,
        }
    }
}

/// Behavioral parameters for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    /// Base ticks required per act; lower is faster. Must be at least 1.
    pub speed: u32,
    /// Perception radius and certain-detection range.
    pub sight: SightProfile,
    /// Chance of taking a wander step on an acting tick with no stimulus.
    pub wander_chance: f64,
    /// Pace multiplier applied during the night phase.
    pub night_factor: f32,
    /// Starting food counter; `0` disables hunger tracking entirely.
    pub food: i32,
    /// Draws above this threshold steer a wander step toward the agent's
    /// home anchor. Only territorial species set it above zero.
    pub home_bias: f64,
}

impl SpeciesProfile {
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.speed == 0 {
            return Err(WorldError::InvalidSpeed { requested: 0 });
        }
        self.sight.validate()?;
        if !(0.0..=1.0).contains(&self.wander_chance) {
            return Err(WorldError::InvalidConfig(
                "wander chance must be within [0, 1]",
            ));
        }
        if self.night_factor.is_nan() || self.night_factor <= 0.0 {
            return Err(WorldError::InvalidConfig(
                "night pace factor must be positive",
            ));
        }
        if self.food < 0 {
            return Err(WorldError::InvalidConfig(
                "starting food must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.home_bias) {
            return Err(WorldError::InvalidConfig(
                "home bias must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Profile lookup table covering every species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTable {
    profiles: [SpeciesProfile; Species::COUNT],
}

impl SpeciesTable {
    #[must_use]
    pub fn profile(&self, species: Species) -> &SpeciesProfile {
        &self.profiles[species.index()]
    }

    /// Mutable profile access for scenario tuning. Re-validate the world
    /// configuration after editing.
    pub fn profile_mut(&mut self, species: Species) -> &mut SpeciesProfile {
        &mut self.profiles[species.index()]
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        for profile in &self.profiles {
            profile.validate()?;
        }
        Ok(())
    }
}

impl Default for SpeciesTable {
    fn default() -> Self {
        let profile = |speed, radius, certain_range, wander_chance, night_factor, food, home_bias| {
            SpeciesProfile {
                speed,
                sight: SightProfile {
                    radius,
                    certain_range,
                },
                wander_chance,
                night_factor,
                food,
                home_bias,
            }
        };
        Self {
            profiles: [
                // Human: alert daytime flee-er, slowed at night.
                profile(2, 12, -1, 0.10, 1.5, 0, 0.0),
                // Zombie: tireless, senses prey through walls up close,
                // faster after dark.
                profile(3, 14, 2, 0.50, 0.75, 0, 0.0),
                // Deer: fast herd prey.
                profile(1, 10, -1, 0.02, 1.0, 0, 0.0),
                // Bear: territorial, anchored to its spawn den.
                profile(2, 8, 1, 0.0, 1.0, 20, 0.7),
                // Boar: short-sighted rooter.
                profile(2, 6, -1, 0.05, 1.0, 10, 0.0),
                // Fox: sharp-nosed skulker.
                profile(1, 7, 3, 0.20, 1.0, 12, 0.0),
                // Wolf: wide-ranging apex predator.
                profile(1, 12, 2, 0.10, 1.0, 25, 0.0),
                // Bunny: skittish and quick.
                profile(1, 5, -1, 0.10, 1.0, 0, 0.0),
                // Pig: penned, never moves on its own.
                profile(3, 4, -1, 0.0, 1.0, 8, 0.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_order_matches_indices() {
        for (idx, species) in Species::ALL.iter().enumerate() {
            assert_eq!(species.index(), idx);
        }
    }

    #[test]
    fn predation_covers_exactly_the_known_pairs() {
        let pairs = [
            (Species::Zombie, Species::Human),
            (Species::Wolf, Species::Bunny),
            (Species::Wolf, Species::Deer),
            (Species::Wolf, Species::Bear),
            (Species::Fox, Species::Bunny),
        ];
        for predator in Species::ALL {
            for prey in Species::ALL {
                let expected = pairs.contains(&(predator, prey));
                assert_eq!(
                    predator.menaces(prey),
                    expected,
                    "{} vs {}",
                    predator.name(),
                    prey.name()
                );
            }
        }
    }

    #[test]
    fn default_table_validates() {
        assert_eq!(SpeciesTable::default().validate(), Ok(()));
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut table = SpeciesTable::default();
        table.profile_mut(Species::Deer).speed = 0;
        assert_eq!(
            table.validate(),
            Err(WorldError::InvalidSpeed { requested: 0 })
        );
    }

    #[test]
    fn only_the_bear_keeps_a_home_anchor() {
        let table = SpeciesTable::default();
        for species in Species::ALL {
            let biased = table.profile(species).home_bias > 0.0;
            assert_eq!(biased, species == Species::Bear, "{}", species.name());
        }
    }
}
