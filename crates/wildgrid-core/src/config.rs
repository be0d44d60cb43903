//! Validated world configuration.

use crate::error::WorldError;
use crate::species::SpeciesTable;
use crate::weather::WeatherConfig;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// Static configuration for a world.
///
/// Construct via `Default` literal-update syntax or deserialize from JSON,
/// then hand to [`crate::WorldState::new`], which validates before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the world RNG. `None` seeds from entropy; runs are
    /// reproducible only when set.
    pub rng_seed: Option<u64>,
    /// Ticks in one full day/night cycle.
    pub ticks_per_day: u32,
    /// Rain lifecycle tunables.
    pub weather: WeatherConfig,
    /// Per-species behavioral profiles.
    pub species: SpeciesTable,
    /// Maximum number of recent tick summaries retained in memory.
    pub history_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            ticks_per_day: 480,
            weather: WeatherConfig::default(),
            species: SpeciesTable::default(),
            history_capacity: 256,
        }
    }
}

impl WorldConfig {
    /// Check every invariant the engine later relies on without checking.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.ticks_per_day == 0 {
            return Err(WorldError::InvalidConfig("ticks_per_day must be non-zero"));
        }
        if self.history_capacity == 0 {
            return Err(WorldError::InvalidConfig(
                "history_capacity must be non-zero",
            ));
        }
        self.weather.validate()?;
        self.species.validate()?;
        Ok(())
    }

    pub(crate) fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    #[test]
    fn default_config_validates() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn nested_sections_are_validated() {
        let mut config = WorldConfig::default();
        config.weather.start_chance = 2.0;
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.species.profile_mut(Species::Fox).wander_chance = -0.5;
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.history_capacity = 0;
        assert_eq!(
            config.validate(),
            Err(WorldError::InvalidConfig(
                "history_capacity must be non-zero"
            ))
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut config = WorldConfig::default();
        config.rng_seed = Some(42);
        config.ticks_per_day = 96;
        let json = serde_json::to_string(&config).unwrap();
        let back: WorldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: WorldConfig = serde_json::from_str(r#"{"rng_seed": 7}"#).unwrap();
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.ticks_per_day, 480);
        assert_eq!(config.validate(), Ok(()));
    }
}
