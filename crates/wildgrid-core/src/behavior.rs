//! Per-species decision functions.
//!
//! Each function maps a frozen perception list to a movement plan without
//! touching world state; legality is the committer's problem. Score-driven
//! species rank all four cardinal steps so that a blocked best choice
//! falls through to the next best instead of wasting the acting tick.

use crate::grid::{Cell, Direction};
use crate::perception::Perceived;
use crate::species::{Species, SpeciesTable};
use ordered_float::OrderedFloat;
use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;

/// A movement decision: stay put, or try directions in order until one
/// commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MovePlan {
    Stay,
    Try(Vec<Direction>),
}

/// Immutable view of the deciding agent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AgentView {
    pub species: Species,
    pub position: Cell,
    pub home: Option<Cell>,
}

/// Decide a movement plan for one acting agent.
pub(crate) fn decide(
    view: AgentView,
    perceived: &[Perceived],
    table: &SpeciesTable,
    rng: &mut SmallRng,
) -> MovePlan {
    let profile = table.profile(view.species);
    match view.species {
        Species::Human | Species::Bunny => {
            flee_plan(view, perceived, profile.wander_chance, rng)
        }
        Species::Deer => herd_plan(view, perceived, profile.wander_chance, rng),
        Species::Zombie => pack_plan(view, perceived, profile.wander_chance, rng),
        Species::Bear => territorial_plan(view, perceived, profile.home_bias, rng),
        Species::Boar | Species::Fox | Species::Wolf => wander_plan(profile.wander_chance, rng),
        Species::Pig => MovePlan::Stay,
    }
}

/// Erratic movement: one gate roll, then a random permutation of the
/// cardinals so a blocked first pick still wanders somewhere.
fn wander_plan(chance: f64, rng: &mut SmallRng) -> MovePlan {
    if !rng.random_bool(chance) {
        return MovePlan::Stay;
    }
    let mut dirs = Direction::CARDINAL;
    dirs.shuffle(rng);
    MovePlan::Try(dirs.to_vec())
}

/// Rank all four candidate steps by `score`, descending. The sort is
/// stable, so equal scores keep the `Direction::CARDINAL` tie-break order.
fn ranked_plan(origin: Cell, score: impl Fn(Cell) -> f64) -> MovePlan {
    let mut ranked: Vec<(Direction, OrderedFloat<f64>)> = Direction::CARDINAL
        .iter()
        .map(|&dir| (dir, OrderedFloat(score(origin.step(dir)))))
        .collect();
    ranked.sort_by_key(|&(_, scored)| Reverse(scored));
    MovePlan::Try(ranked.into_iter().map(|(dir, _)| dir).collect())
}

/// Maximize summed squared distance to every perceived threat; with no
/// threat in sight, fall back to wandering.
fn flee_plan(
    view: AgentView,
    perceived: &[Perceived],
    wander_chance: f64,
    rng: &mut SmallRng,
) -> MovePlan {
    let threats: Vec<Cell> = perceived
        .iter()
        .filter(|p| p.species.menaces(view.species))
        .map(|p| p.position)
        .collect();
    if threats.is_empty() {
        return wander_plan(wander_chance, rng);
    }
    ranked_plan(view.position, |cell| {
        threats.iter().map(|&t| cell.dist_sq(t) as f64).sum()
    })
}

/// Deer weigh strong short-range repulsion from anything that is neither
/// deer nor bunny against mild herd cohesion toward other deer.
fn herd_plan(
    view: AgentView,
    perceived: &[Perceived],
    wander_chance: f64,
    rng: &mut SmallRng,
) -> MovePlan {
    let mut threats = Vec::new();
    let mut herd = Vec::new();
    for p in perceived {
        match p.species {
            Species::Deer => herd.push(p.position),
            Species::Bunny => {}
            _ => threats.push(p.position),
        }
    }
    if threats.is_empty() && herd.is_empty() {
        return wander_plan(wander_chance, rng);
    }
    ranked_plan(view.position, |cell| {
        let repulsion: f64 = threats
            .iter()
            .map(|&t| -40.0 / (cell.dist_sq(t) as f64 + 1.0))
            .sum();
        let cohesion: f64 = herd
            .iter()
            .map(|&h| 1.0 / (cell.dist_sq(h) as f64 + 1.0))
            .sum();
        repulsion + cohesion
    })
}

/// Zombies shamble toward other zombies, forming packs that sweep the map
/// together.
fn pack_plan(
    view: AgentView,
    perceived: &[Perceived],
    wander_chance: f64,
    rng: &mut SmallRng,
) -> MovePlan {
    let pack: Vec<Cell> = perceived
        .iter()
        .filter(|p| p.species == Species::Zombie)
        .map(|p| p.position)
        .collect();
    if pack.is_empty() {
        return wander_plan(wander_chance, rng);
    }
    ranked_plan(view.position, |cell| {
        pack.iter()
            .map(|&z| 100.0 / (cell.dist_sq(z) as f64 + 1.0))
            .sum()
    })
}

/// Bears shove away from the Manhattan-nearest rival bear, or drift near
/// their den when alone.
fn territorial_plan(
    view: AgentView,
    perceived: &[Perceived],
    home_bias: f64,
    rng: &mut SmallRng,
) -> MovePlan {
    let nearest_rival = perceived
        .iter()
        .filter(|p| p.species == Species::Bear)
        .min_by_key(|p| view.position.manhattan(p.position));
    match nearest_rival {
        Some(rival) => away_step(view.position, rival.position),
        None => homeward_step(view.position, view.home, home_bias, rng),
    }
}

/// Step directly away from `rival`: the dominant displacement axis first,
/// the other axis as fallback.
fn away_step(me: Cell, rival: Cell) -> MovePlan {
    let d_row = me.row - rival.row;
    let d_col = me.col - rival.col;
    let row_dir = if d_row >= 0 {
        Direction::Down
    } else {
        Direction::Up
    };
    let col_dir = if d_col >= 0 {
        Direction::Right
    } else {
        Direction::Left
    };
    if d_row.abs() >= d_col.abs() {
        MovePlan::Try(vec![row_dir, col_dir])
    } else {
        MovePlan::Try(vec![col_dir, row_dir])
    }
}

/// One drifting step. Each axis rolls once; a roll above the bias
/// threshold pulls homeward along that axis, the larger displacement
/// winning when both trigger. Otherwise the step is uniformly random.
/// A single attempt: a blocked step is simply forfeited.
fn homeward_step(me: Cell, home: Option<Cell>, bias: f64, rng: &mut SmallRng) -> MovePlan {
    let (d_row, d_col) = match home {
        Some(h) => (h.row - me.row, h.col - me.col),
        None => (0, 0),
    };
    let row_pull = rng.random::<f64>() > bias && d_row != 0;
    let col_pull = rng.random::<f64>() > bias && d_col != 0;
    let dir = if row_pull && (!col_pull || d_row.abs() >= d_col.abs()) {
        if d_row > 0 { Direction::Down } else { Direction::Up }
    } else if col_pull {
        if d_col > 0 { Direction::Right } else { Direction::Left }
    } else {
        Direction::CARDINAL[rng.random_range(0..Direction::CARDINAL.len())]
    };
    MovePlan::Try(vec![dir])
}
