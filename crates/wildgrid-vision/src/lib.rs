//! Line-of-sight and disc-scan geometry for grid worlds.
//!
//! The engine crate supplies an [`OpacityMap`] view of its terrain; this
//! crate answers the two geometric questions perception needs: which cells
//! fall inside a vision disc, and whether a straight sight line between two
//! cells is unbroken.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors emitted by sight-geometry configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisionError {
    /// Indicates configuration values that cannot be used (e.g., a negative radius).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Read-only opacity queries over a rectangular map.
///
/// Cells outside the map must report as blocking. Sight lines between
/// in-bounds endpoints never leave the endpoints' bounding box.
pub trait OpacityMap {
    /// Whether the cell at `(row, col)` interrupts sight lines.
    fn blocks_sight(&self, row: i32, col: i32) -> bool;
}

/// Per-species sight parameters: how far an agent sees, and inside which
/// range detection ignores obstacles entirely (scent/hearing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SightProfile {
    /// Maximum Euclidean distance at which other agents can be perceived.
    pub radius: i32,
    /// Range inside which perception bypasses line-of-sight; `-1` disables
    /// the bypass entirely.
    pub certain_range: i32,
}

impl SightProfile {
    /// Build a validated profile from a vision radius and a
    /// certain-detection range.
    pub fn new(radius: i32, certain_range: i32) -> Result<Self, VisionError> {
        let profile = Self {
            radius,
            certain_range,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Re-check invariants (used after deserializing configuration).
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.radius < 0 {
            return Err(VisionError::InvalidConfig(
                "vision radius must be non-negative",
            ));
        }
        if self.certain_range < -1 {
            return Err(VisionError::InvalidConfig(
                "certain range must be -1 or non-negative",
            ));
        }
        Ok(())
    }
}

/// Squared Euclidean distance between two cells, overflow-safe.
#[must_use]
pub fn dist_sq(a: (i32, i32), b: (i32, i32)) -> i64 {
    let dr = i64::from(a.0) - i64::from(b.0);
    let dc = i64::from(a.1) - i64::from(b.1);
    dr * dr + dc * dc
}

/// Whether an unbroken sight line connects `from` and `to`.
///
/// Rules, in order:
/// - a cell always sees itself, obstacle or not;
/// - when `certain_range >= 0` and the squared distance is within
///   `certain_range²`, the pair is force-visible and obstacles are ignored;
/// - otherwise the discrete Bresenham line is traced and the first
///   sight-blocking cell breaks the line. Both endpoints' obstacle status
///   participates; occupancy never does.
///
/// The traced endpoints are canonicalized, so the result is symmetric:
/// `line_clear(m, a, b, r) == line_clear(m, b, a, r)` for any map.
#[must_use]
pub fn line_clear(
    map: &impl OpacityMap,
    from: (i32, i32),
    to: (i32, i32),
    certain_range: i32,
) -> bool {
    if from == to {
        return true;
    }
    if certain_range >= 0 {
        let reach = i64::from(certain_range);
        if dist_sq(from, to) <= reach * reach {
            return true;
        }
    }
    let (a, b) = if to < from { (to, from) } else { (from, to) };
    !blocked_along(map, a, b)
}

/// Walk the Bresenham line from `a` to `b` inclusive, reporting whether any
/// traversed cell blocks sight. Runs in O(max(|Δrow|, |Δcol|)).
fn blocked_along(map: &impl OpacityMap, a: (i32, i32), b: (i32, i32)) -> bool {
    let (mut row, mut col) = a;
    let (end_row, end_col) = b;
    let d_row = (end_row - row).abs();
    let d_col = (end_col - col).abs();
    let step_row = if row < end_row { 1 } else { -1 };
    let step_col = if col < end_col { 1 } else { -1 };
    let mut err = d_col - d_row;

    loop {
        if map.blocks_sight(row, col) {
            return true;
        }
        if row == end_row && col == end_col {
            return false;
        }
        let twice = 2 * err;
        if twice > -d_row {
            err -= d_row;
            col += step_col;
        }
        if twice < d_col {
            err += d_col;
            row += step_row;
        }
    }
}

/// All cells within Euclidean distance `radius` of `origin` (origin
/// included), paired with their squared distance.
///
/// Traversal is row-major over the bounding square; callers needing
/// deterministic tie-breaking may rely on that order, nothing else. Cells
/// are not bounds-checked against any map.
pub fn disc_cells(
    origin: (i32, i32),
    radius: i32,
) -> impl Iterator<Item = ((i32, i32), i64)> {
    let reach = radius.max(0);
    let reach_sq = i64::from(reach) * i64::from(reach);
    ((origin.0 - reach)..=(origin.0 + reach)).flat_map(move |row| {
        ((origin.1 - reach)..=(origin.1 + reach)).filter_map(move |col| {
            let d = dist_sq(origin, (row, col));
            (d <= reach_sq).then_some(((row, col), d))
        })
    })
}
