//! Precipitation: a probabilistic rain lifecycle and the pace penalty it
//! applies while active.

use crate::error::WorldError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunables for the rain lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Per-tick chance that rain starts while the sky is clear.
    pub start_chance: f64,
    /// Per-tick chance that active rain stops.
    pub stop_chance: f64,
    /// Upper bound for the rolled intensity, inclusive.
    pub max_intensity: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            start_chance: 0.004,
            stop_chance: 0.02,
            max_intensity: 8,
        }
    }
}

impl WeatherConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(0.0..=1.0).contains(&self.start_chance) {
            return Err(WorldError::InvalidConfig(
                "rain start chance must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.stop_chance) {
            return Err(WorldError::InvalidConfig(
                "rain stop chance must be within [0, 1]",
            ));
        }
        if self.max_intensity == 0 {
            return Err(WorldError::InvalidConfig(
                "max rain intensity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Outcome of one per-tick weather draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WeatherShift {
    Unchanged,
    Started(u32),
    Stopped,
}

/// Live precipitation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Weather {
    active: bool,
    intensity: u32,
}

impl Weather {
    #[must_use]
    pub const fn is_raining(&self) -> bool {
        self.active
    }

    /// Rolled intensity of the current rain, `0` while clear.
    #[must_use]
    pub const fn intensity(&self) -> u32 {
        self.intensity
    }

    /// Extra ticks-per-act added to every agent while rain is active.
    #[must_use]
    pub const fn pace_penalty(&self) -> u32 {
        if self.active { self.intensity / 2 } else { 0 }
    }

    /// One lifecycle draw: roll to start while clear, roll to stop while
    /// raining. Never both in the same tick.
    pub(crate) fn advance<R: Rng>(&mut self, config: &WeatherConfig, rng: &mut R) -> WeatherShift {
        if self.active {
            if rng.random_bool(config.stop_chance) {
                self.active = false;
                self.intensity = 0;
                return WeatherShift::Stopped;
            }
        } else if rng.random_bool(config.start_chance) {
            self.active = true;
            self.intensity = rng.random_range(1..=config.max_intensity);
            return WeatherShift::Started(self.intensity);
        }
        WeatherShift::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn config_rejects_out_of_range_chances() {
        let mut config = WeatherConfig::default();
        config.start_chance = 1.5;
        assert!(config.validate().is_err());
        config.start_chance = 0.5;
        config.stop_chance = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn certain_rain_starts_and_stops() {
        let config = WeatherConfig {
            start_chance: 1.0,
            stop_chance: 1.0,
            max_intensity: 6,
        };
        let mut rng = SmallRng::seed_from_u64(7);
        let mut weather = Weather::default();

        let shift = weather.advance(&config, &mut rng);
        let WeatherShift::Started(intensity) = shift else {
            panic!("expected rain to start, got {shift:?}");
        };
        assert!((1..=6).contains(&intensity));
        assert!(weather.is_raining());
        assert_eq!(weather.pace_penalty(), intensity / 2);

        assert_eq!(weather.advance(&config, &mut rng), WeatherShift::Stopped);
        assert!(!weather.is_raining());
        assert_eq!(weather.pace_penalty(), 0);
    }

    #[test]
    fn clear_skies_never_roll_a_stop() {
        let config = WeatherConfig {
            start_chance: 0.0,
            stop_chance: 1.0,
            max_intensity: 4,
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let mut weather = Weather::default();
        for _ in 0..50 {
            assert_eq!(weather.advance(&config, &mut rng), WeatherShift::Unchanged);
        }
    }

    #[test]
    fn light_rain_has_no_penalty() {
        let config = WeatherConfig {
            start_chance: 1.0,
            stop_chance: 0.0,
            max_intensity: 1,
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let mut weather = Weather::default();
        weather.advance(&config, &mut rng);
        assert!(weather.is_raining());
        assert_eq!(weather.intensity(), 1);
        assert_eq!(weather.pace_penalty(), 0);
    }
}
