//! The day/night clock: normalized time of day and its discrete phases.

use crate::error::WorldError;
use serde::{Deserialize, Serialize};

/// Normalized time at which daylight starts; dawn covers `[0, DAY_START)`.
const DAY_START: f64 = 0.10;
const DUSK_START: f64 = 0.55;
const NIGHT_START: f64 = 0.65;

/// Discrete phase of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    Dawn,
    Day,
    Dusk,
    Night,
}

/// Wrapping tick counter over a fixed-length day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCycle {
    ticks_per_day: u32,
    tick_of_day: u32,
}

impl DayCycle {
    pub fn new(ticks_per_day: u32) -> Result<Self, WorldError> {
        if ticks_per_day == 0 {
            return Err(WorldError::InvalidConfig("ticks_per_day must be non-zero"));
        }
        Ok(Self {
            ticks_per_day,
            tick_of_day: 0,
        })
    }

    #[must_use]
    pub const fn ticks_per_day(&self) -> u32 {
        self.ticks_per_day
    }

    #[must_use]
    pub const fn tick_of_day(&self) -> u32 {
        self.tick_of_day
    }

    /// Time of day normalized to `[0, 1)`. The upper bound is strict for
    /// every day length.
    #[must_use]
    pub fn normalized(&self) -> f64 {
        f64::from(self.tick_of_day) / f64::from(self.ticks_per_day)
    }

    #[must_use]
    pub fn phase(&self) -> DayPhase {
        let t = self.normalized();
        if t < DAY_START {
            DayPhase::Dawn
        } else if t < DUSK_START {
            DayPhase::Day
        } else if t < NIGHT_START {
            DayPhase::Dusk
        } else {
            DayPhase::Night
        }
    }

    #[must_use]
    pub fn is_night(&self) -> bool {
        self.phase() == DayPhase::Night
    }

    /// Advance one tick, wrapping at the end of the day.
    pub(crate) fn advance(&mut self) {
        self.tick_of_day = (self.tick_of_day + 1) % self.ticks_per_day;
    }
}
