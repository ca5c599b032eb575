#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure geometric queries over a round state: line of sight along the eight
//! compass directions and the footprints of the area weapons.

use worms_core::{
    Coord, Direction, Side, Terrain, WormId, BANANA_BLAST, SHOT_RANGE, SNOWBALL_SPREAD,
    THROW_RANGE,
};
use worms_world::{RoundState, Worm};

/// Parameters that shape a single line-of-sight walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SightRules {
    /// Largest truncated distance from the origin the walk may reach.
    pub max_range: u32,
    /// Dirt cell treated as open because it is being dug this turn.
    pub dug: Option<Coord>,
    /// Unit the walk passes through as if its cell were empty.
    pub transparent: Option<WormId>,
}

impl SightRules {
    /// Rules for a rifle shot: range four, no exceptions.
    #[must_use]
    pub const fn rifle() -> Self {
        Self {
            max_range: SHOT_RANGE,
            dug: None,
            transparent: None,
        }
    }

    /// Returns the rules with a dug-out dirt cell treated as open.
    #[must_use]
    pub const fn with_dug(self, dug: Option<Coord>) -> Self {
        Self {
            max_range: self.max_range,
            dug,
            transparent: self.transparent,
        }
    }

    /// Returns the rules with a unit the walk passes through.
    #[must_use]
    pub const fn with_transparent(self, transparent: Option<WormId>) -> Self {
        Self {
            max_range: self.max_range,
            dug: self.dug,
            transparent,
        }
    }
}

/// Result of a line-of-sight walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sight {
    /// Open cells traversed before the walk stopped, nearest first.
    pub cells: Vec<Coord>,
    /// Living unit the walk stopped on, of either side.
    pub hit: Option<WormId>,
}

/// Walks from `origin` one cell at a time in `direction`.
///
/// The walk stops without a hit when it leaves the map, exceeds the maximum
/// range, or reaches a non-air cell other than the dug exception. It stops
/// with a hit on the first living unit that is not transparent. Callers
/// decide whether a hit unit is a target or merely an obstruction.
#[must_use]
pub fn line_of_sight(
    state: &RoundState,
    origin: Coord,
    direction: Direction,
    rules: &SightRules,
) -> Sight {
    let mut sight = Sight::default();
    let mut position = origin;

    loop {
        position = position.step(direction);
        if position.range_to(origin) > rules.max_range {
            break;
        }

        let Some(cell) = state.cell(position) else {
            break;
        };
        if cell.terrain != Terrain::Air && rules.dug != Some(position) {
            break;
        }

        if let Some(occupant) = state.occupant(position) {
            if rules.transparent != Some(occupant.id) {
                sight.hit = Some(occupant.id);
                break;
            }
        }

        sight.cells.push(position);
    }

    sight
}

/// The unit a shot from `shooter` in `direction` would strike, if the first
/// unit in the line of fire belongs to the other side.
#[must_use]
pub fn shot_target<'state>(
    state: &'state RoundState,
    shooter: &Worm,
    direction: Direction,
) -> Option<&'state Worm> {
    let sight = line_of_sight(state, shooter.position, direction, &SightRules::rifle());
    sight
        .hit
        .and_then(|id| state.worm(id))
        .filter(|target| target.side() != shooter.side())
}

/// Every direction in which `shooter` has a clean shot, with the unit struck.
#[must_use]
pub fn shots<'state>(
    state: &'state RoundState,
    shooter: &Worm,
) -> Vec<(Direction, &'state Worm)> {
    Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            shot_target(state, shooter, direction).map(|target| (direction, target))
        })
        .collect()
}

/// Directions in which `shooter` currently has a target of side `victims`.
#[must_use]
pub fn firing_directions(state: &RoundState, shooter: &Worm, victims: Side) -> Vec<Direction> {
    shots(state, shooter)
        .into_iter()
        .filter(|(_, target)| target.side() == victims)
        .map(|(direction, _)| direction)
        .collect()
}

/// Cells within throwing range of `origin`, in row-major order.
pub fn throw_targets(state: &RoundState, origin: Coord) -> impl Iterator<Item = Coord> + '_ {
    state
        .cells()
        .map(|(coord, _)| coord)
        .filter(move |&coord| origin.range_to(coord) <= THROW_RANGE)
}

/// On-map cells hit by a banana landing at `center`, with the damage dealt.
pub fn banana_footprint(
    state: &RoundState,
    center: Coord,
) -> impl Iterator<Item = (Coord, u32)> + '_ {
    BANANA_BLAST
        .into_iter()
        .map(move |((dx, dy), damage)| (center.offset(dx, dy), damage))
        .filter(move |&(coord, _)| state.contains(coord))
}

/// On-map cells frozen by a snowball landing at `center`.
pub fn snowball_footprint(state: &RoundState, center: Coord) -> impl Iterator<Item = Coord> + '_ {
    SNOWBALL_SPREAD
        .into_iter()
        .map(move |(dx, dy)| center.offset(dx, dy))
        .filter(move |&coord| state.contains(coord))
}
