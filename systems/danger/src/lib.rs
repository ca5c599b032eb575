#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Danger model: which cells the enemies of a unit could hit before that
//! unit's side acts again.
//!
//! Every query is computed fresh from an immutable [`RoundState`]. Results are
//! ordered sets so that callers iterating them stay deterministic.

use std::collections::{BTreeMap, BTreeSet};

use worms_core::{Coord, Direction, WormId};
use worms_system_spatial::{
    banana_footprint, firing_directions, line_of_sight, throw_targets, SightRules,
};
use worms_world::{RoundState, Worm};

/// Parameters of a dangerous-cell query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DangerQuery {
    subject: WormId,
    enemies: Option<Vec<WormId>>,
    dug: Option<Coord>,
    include_banana: bool,
    exclude_current: bool,
}

impl DangerQuery {
    /// Danger to `subject` from every enemy acting before the own side's next
    /// turn with the same unit, bananas included.
    #[must_use]
    pub const fn against(subject: WormId) -> Self {
        Self {
            subject,
            enemies: None,
            dug: None,
            include_banana: true,
            exclude_current: false,
        }
    }

    /// Restricts the query to an explicit set of enemies.
    #[must_use]
    pub fn with_enemies(mut self, enemies: Vec<WormId>) -> Self {
        self.enemies = Some(enemies);
        self
    }

    /// Treats a dirt cell as open, as if it had been dug this turn.
    #[must_use]
    pub const fn with_dug(mut self, dug: Option<Coord>) -> Self {
        self.dug = dug;
        self
    }

    /// Ignores banana throws.
    #[must_use]
    pub const fn without_bananas(mut self) -> Self {
        self.include_banana = false;
        self
    }

    /// Drops the enemy side's active unit, keeping only the shots it can
    /// already line up on the subject's side.
    #[must_use]
    pub const fn excluding_current(mut self) -> Self {
        self.exclude_current = true;
        self
    }

    /// Unit the danger is measured against.
    #[must_use]
    pub const fn subject(&self) -> WormId {
        self.subject
    }
}

/// Enemies of `subject` that get to act before the own side's next turn with
/// its current unit.
///
/// The turn-order flag is only derived for opponent units, so subjects of the
/// opponent side have no default enemies and must name them explicitly.
#[must_use]
pub fn default_enemies(state: &RoundState, subject: WormId) -> Vec<WormId> {
    state
        .living(subject.side().opposite())
        .filter(|worm| worm.acts_before_next_turn)
        .map(|worm| worm.id)
        .collect()
}

/// Cells in which the query's subject could be hit.
#[must_use]
pub fn dangerous_cells(state: &RoundState, query: &DangerQuery) -> BTreeSet<Coord> {
    let enemies = query
        .enemies
        .clone()
        .unwrap_or_else(|| default_enemies(state, query.subject));
    let enemy_side = query.subject.side().opposite();
    let current = state.active_worm(enemy_side).id;

    let mut cells = BTreeSet::new();
    for id in &enemies {
        if query.exclude_current && *id == current {
            continue;
        }
        let Some(enemy) = state.worm(*id).filter(|worm| worm.is_alive()) else {
            continue;
        };
        reach(state, enemy, query, &Direction::ALL, &mut cells);
    }

    if query.exclude_current && enemies.contains(&current) {
        current_shot_reach(state, query, &mut cells);
    }

    cells
}

/// Cells the enemy side's active unit can hit with the shots it currently has
/// lined up on `subject`'s side, plus its banana reach when requested.
#[must_use]
pub fn danger_from_current_shot(
    state: &RoundState,
    subject: WormId,
    include_banana: bool,
) -> BTreeSet<Coord> {
    let mut query = DangerQuery::against(subject);
    if !include_banana {
        query = query.without_bananas();
    }
    let mut cells = BTreeSet::new();
    current_shot_reach(state, &query, &mut cells);
    cells
}

/// Reach of the enemy side's active unit, limited to the directions in which
/// it already has a target on the subject's side.
fn current_shot_reach(state: &RoundState, query: &DangerQuery, cells: &mut BTreeSet<Coord>) {
    let active = state.active_worm(query.subject.side().opposite());
    if !active.is_alive() {
        return;
    }
    let directions = firing_directions(state, active, query.subject.side());
    reach(state, active, query, &directions, cells);
}

/// Number of distinct non-active default enemies of `subject` able to hit each
/// cell. Cells nobody can hit are absent.
#[must_use]
pub fn shootability_count(state: &RoundState, subject: WormId) -> BTreeMap<Coord, u32> {
    let current = state.active_worm(subject.side().opposite()).id;
    let query = DangerQuery::against(subject);

    let mut counts = BTreeMap::new();
    for id in default_enemies(state, subject) {
        if id == current {
            continue;
        }
        let Some(enemy) = state.worm(id) else {
            continue;
        };
        let mut cells = BTreeSet::new();
        reach(state, enemy, &query, &Direction::ALL, &mut cells);
        for cell in cells {
            *counts.entry(cell).or_insert(0) += 1;
        }
    }
    counts
}

/// Default enemies that can hit `subject` where it stands, either along a line
/// of sight or with a banana that spares their own side.
#[must_use]
pub fn threats_to(state: &RoundState, subject: &Worm) -> Vec<WormId> {
    default_enemies(state, subject.id)
        .into_iter()
        .filter(|&id| {
            state
                .worm(id)
                .is_some_and(|enemy| can_hit(state, enemy, subject))
        })
        .collect()
}

fn can_hit(state: &RoundState, enemy: &Worm, subject: &Worm) -> bool {
    let shot = Direction::ALL.into_iter().any(|direction| {
        line_of_sight(state, enemy.position, direction, &SightRules::rifle()).hit
            == Some(subject.id)
    });
    if shot {
        return true;
    }

    enemy.bananas > 0
        && viable_blasts(state, enemy).any(|target| {
            banana_footprint(state, target).any(|(coord, _)| coord == subject.position)
        })
}

/// Adds every cell `enemy` can hit to `cells`: rifle walks in `directions`
/// and, when allowed, the footprint of every banana that spares its own side.
fn reach(
    state: &RoundState,
    enemy: &Worm,
    query: &DangerQuery,
    directions: &[Direction],
    cells: &mut BTreeSet<Coord>,
) {
    let rules = SightRules::rifle()
        .with_dug(query.dug)
        .with_transparent(Some(query.subject));
    for &direction in directions {
        cells.extend(line_of_sight(state, enemy.position, direction, &rules).cells);
    }

    if query.include_banana && enemy.bananas > 0 {
        for target in viable_blasts(state, enemy) {
            cells.extend(banana_footprint(state, target).map(|(coord, _)| coord));
        }
    }
}

/// Banana targets of `thrower` whose blast touches no living unit of its own
/// side, the thrower included.
fn viable_blasts<'state>(
    state: &'state RoundState,
    thrower: &'state Worm,
) -> impl Iterator<Item = Coord> + 'state {
    throw_targets(state, thrower.position).filter(move |&target| {
        banana_footprint(state, target).all(|(coord, _)| {
            state
                .occupant(coord)
                .map_or(true, |worm| worm.side() != thrower.side())
        })
    })
}
