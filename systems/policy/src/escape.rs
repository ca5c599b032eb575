//! Cell rankings used to pick where to go, and the retreat cascade.

use std::collections::BTreeSet;

use worms_core::{Action, Coord, Move, Side, MAP_CENTRE};
use worms_system_danger::{dangerous_cells, shootability_count, DangerQuery};
use worms_world::{query, RoundState};

use crate::{targeting, turn::Turn};

/// The candidate maximising the summed distance to living opponents. Ties go
/// to the cell nearest the map centre, then to the earlier candidate.
pub(crate) fn furthest_from_opponents(state: &RoundState, candidates: &[Coord]) -> Option<Coord> {
    let opponents: Vec<Coord> = state
        .living(Side::Opponent)
        .map(|worm| worm.position)
        .collect();
    let spread = |cell: Coord| -> f64 {
        opponents
            .iter()
            .map(|&other| cell.distance(other))
            .sum()
    };

    let mut best: Option<(Coord, f64, f64)> = None;
    for &cell in candidates {
        let weight = spread(cell);
        let centre = cell.distance(MAP_CENTRE);
        let better = match best {
            None => true,
            Some((_, best_weight, best_centre)) => {
                weight > best_weight || (weight == best_weight && centre < best_centre)
            }
        };
        if better {
            best = Some((cell, weight, centre));
        }
    }
    best.map(|(cell, _, _)| cell)
}

/// The candidate nearest the map centre, preferring one outside `danger`.
pub(crate) fn closest_to_centre(candidates: &[Coord], danger: &BTreeSet<Coord>) -> Option<Coord> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| a.distance(MAP_CENTRE).total_cmp(&b.distance(MAP_CENTRE)));
    ordered
        .iter()
        .copied()
        .find(|cell| !danger.contains(cell))
        .or_else(|| ordered.first().copied())
}

/// The candidate with the strongest pull towards the dirt left inside the lava
/// ring, each dirt cell pulling with the inverse square of its distance.
pub(crate) fn weight_to_dirt(state: &RoundState, candidates: &[Coord]) -> Option<Coord> {
    let dirt = query::buried_dirt(state);
    let pull = |cell: Coord| -> f64 {
        dirt.iter()
            .map(|&other| 1.0 / cell.distance(other).powi(2))
            .sum()
    };

    let mut best: Option<(Coord, f64)> = None;
    for &cell in candidates {
        let weight = pull(cell);
        if best.map_or(true, |(_, strongest)| weight > strongest) {
            best = Some((cell, weight));
        }
    }
    best.map(|(cell, _)| cell)
}

/// The candidate nearest to `target`, earliest on ties.
pub(crate) fn nearest_to(target: Coord, candidates: &[Coord]) -> Option<Coord> {
    let mut best: Option<(Coord, f64)> = None;
    for &cell in candidates {
        let distance = cell.distance(target);
        if best.map_or(true, |(_, nearest)| distance < nearest) {
            best = Some((cell, distance));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Gets the active unit out of the line of fire, relaxing the notion of
/// safety step by step until some move qualifies.
pub(crate) fn run_away(turn: &Turn<'_>) -> Move {
    let state = turn.state;
    let subject = turn.subject.id;
    let moves = turn.moves();

    let step = |cells: &[Coord]| {
        furthest_from_opponents(state, cells).map(|cell| Move::new(Action::Move(cell)))
    };

    if let Some(chosen) = step(&turn.safe(&moves)) {
        tracing::debug!(target: "worms::policy", "run_away.safe");
        return chosen;
    }

    let relaxed = [
        DangerQuery::against(subject).excluding_current(),
        DangerQuery::against(subject).excluding_current().without_bananas(),
    ];
    for query in &relaxed {
        let danger = dangerous_cells(state, query);
        let safe: Vec<Coord> = moves
            .iter()
            .copied()
            .filter(|cell| !danger.contains(cell))
            .collect();
        if let Some(chosen) = step(&safe) {
            tracing::debug!(target: "worms::policy", danger = danger.len(), "run_away.relaxed");
            return chosen;
        }
    }

    if !moves.is_empty() {
        let counts = shootability_count(state, subject);
        let count = |cell: &Coord| counts.get(cell).copied().unwrap_or(0);
        let least = moves.iter().map(count).min().unwrap_or(0);

        if count(&turn.subject.position) < least {
            tracing::debug!(target: "worms::policy", least, "run_away.hold");
            return targeting::shoot_or_wait(turn);
        }

        let least_shootable: Vec<Coord> = moves
            .iter()
            .copied()
            .filter(|cell| count(cell) == least)
            .collect();
        if let Some(chosen) = step(&least_shootable) {
            tracing::debug!(target: "worms::policy", least, "run_away.least_shootable");
            return chosen;
        }
    }

    if let Some(cell) = furthest_from_opponents(state, &turn.digs()) {
        tracing::debug!(target: "worms::policy", "run_away.dig");
        return Move::new(Action::Dig(cell));
    }

    tracing::debug!(target: "worms::policy", "run_away.cornered");
    targeting::shoot_or_wait(turn)
}
