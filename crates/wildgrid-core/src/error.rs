//! Error taxonomy for world construction, configuration, and placement.

use crate::grid::Cell;
use thiserror::Error;
use wildgrid_vision::VisionError;

/// Errors surfaced at the engine's validation boundaries.
///
/// The tick loop itself has no recoverable failures: once a world is
/// built, illegal actions are skipped rather than reported, and broken
/// internal invariants are programming errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    /// A configuration value failed validation.
    #[error("invalid world configuration: {0}")]
    InvalidConfig(&'static str),

    /// A pace assignment that would stall the scheduler.
    #[error("pace must be at least 1 tick per act, got {requested}")]
    InvalidSpeed { requested: i64 },

    /// A spawn target was rejected.
    #[error("cannot place agent at {at}: {reason}")]
    PlacementInvalid { at: Cell, reason: &'static str },

    /// A coordinate fell outside the grid extents.
    #[error("{at} lies outside the {rows}x{cols} grid")]
    OutOfBounds { at: Cell, rows: i32, cols: i32 },
}

impl From<VisionError> for WorldError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::InvalidConfig(reason) => Self::InvalidConfig(reason),
        }
    }
}
