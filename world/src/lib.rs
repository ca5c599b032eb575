#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable round state for the worms decision engine.
//!
//! A [`RoundState`] is rebuilt from scratch every round from the engine's
//! [`RoundSnapshot`]. Units live in one arena per side and are addressed by
//! their [`WormId`]; a separate coordinate map records which living unit
//! occupies which cell. Both are validated once during construction and never
//! mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use worms_core::{
    AmmoLedger, Coord, Profession, RoundSnapshot, Side, SideSnapshot, Terrain, WormId,
};

mod turn_order;

#[cfg(any(test, feature = "scaffolding"))]
pub mod scaffolding;

/// Terrain and pickup state of a materialised map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Terrain covering the cell. Never [`Terrain::DeepSpace`].
    pub terrain: Terrain,
    /// Whether a powerup lies on the cell.
    pub powerup: bool,
}

/// A unit as seen during the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Worm {
    /// Stable identity of the unit.
    pub id: WormId,
    /// Cell occupied by the unit.
    pub position: Coord,
    /// Remaining health; the unit is dead at zero or below.
    pub health: i32,
    /// Weapon specialisation.
    pub profession: Profession,
    /// Banana bombs held. Inferred from the ammo ledger for opponents.
    pub bananas: u32,
    /// Snowballs held. Inferred from the ammo ledger for opponents.
    pub snowballs: u32,
    /// Rounds until the unit may act again.
    pub rounds_until_unfrozen: u32,
    /// Whether the unit is its side's mover this round.
    pub active: bool,
    /// Whether this opponent unit gets to act before the own side's next turn
    /// with the currently active unit comes around again.
    pub acts_before_next_turn: bool,
    /// Turns until this own unit becomes the active unit, zero when it already is.
    pub turns_till_active: Option<u32>,
}

impl Worm {
    /// Reports whether the unit is still in the match.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Side the unit fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.id.side()
    }

    /// Reports whether the unit is currently frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.rounds_until_unfrozen > 0
    }
}

/// Reasons a snapshot cannot be turned into a round state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// A side reported no units at all.
    #[error("{side:?} side reports no worms")]
    NoWorms {
        /// Side missing its units.
        side: Side,
    },
    /// A side reported more units than an identity can address.
    #[error("{side:?} side reports {count} worms")]
    TooManyWorms {
        /// Side with the oversized roster.
        side: Side,
        /// Number of units reported.
        count: usize,
    },
    /// The current unit index does not name a reported unit.
    #[error("{side:?} current worm {index} is out of range for {count} worms")]
    CurrentWormOutOfRange {
        /// Side with the bad index.
        side: Side,
        /// Index reported as current.
        index: u8,
        /// Number of units reported.
        count: usize,
    },
    /// A living unit stands on a cell that is not part of the map.
    #[error("worm {id:?} stands at {position:?} which is off the map")]
    WormOffGrid {
        /// Unit standing off the map.
        id: WormId,
        /// Reported position.
        position: Coord,
    },
    /// Two living units report the same cell.
    #[error("worms {first:?} and {second:?} both occupy {position:?}")]
    SharedCell {
        /// Unit registered first.
        first: WormId,
        /// Unit registered second.
        second: WormId,
        /// Contested cell.
        position: Coord,
    },
}

#[derive(Clone, Debug)]
struct Team {
    score: i32,
    current: u8,
    selections_remaining: u32,
    previous_command: Option<String>,
    worms: Vec<Worm>,
}

/// Complete, validated state of one round.
#[derive(Clone, Debug)]
pub struct RoundState {
    round: u32,
    consecutive_do_nothings: u32,
    own: Team,
    opponent: Team,
    cells: BTreeMap<Coord, Cell>,
    occupancy: HashMap<Coord, WormId>,
}

impl RoundState {
    /// Builds the round state from an engine snapshot.
    ///
    /// Opponent ammunition is not visible in the snapshot, so the provided
    /// ledger is applied to each opponent's professional baseline. Deep-space
    /// cells are dropped and dead units are left out of the occupancy map.
    pub fn new(snapshot: RoundSnapshot, ledger: &AmmoLedger) -> Result<Self, SnapshotError> {
        let cells: BTreeMap<Coord, Cell> = snapshot
            .cells
            .iter()
            .filter(|cell| cell.terrain != Terrain::DeepSpace)
            .map(|cell| {
                (
                    cell.coord,
                    Cell {
                        terrain: cell.terrain,
                        powerup: cell.powerup,
                    },
                )
            })
            .collect();

        let own = build_team(Side::Own, snapshot.own, ledger)?;
        let opponent = build_team(Side::Opponent, snapshot.opponent, ledger)?;

        let mut occupancy = HashMap::new();
        for worm in own.worms.iter().chain(opponent.worms.iter()) {
            if !worm.is_alive() {
                continue;
            }
            if !cells.contains_key(&worm.position) {
                return Err(SnapshotError::WormOffGrid {
                    id: worm.id,
                    position: worm.position,
                });
            }
            if let Some(first) = occupancy.insert(worm.position, worm.id) {
                return Err(SnapshotError::SharedCell {
                    first,
                    second: worm.id,
                    position: worm.position,
                });
            }
        }

        let mut state = Self {
            round: snapshot.round,
            consecutive_do_nothings: snapshot.consecutive_do_nothings,
            own,
            opponent,
            cells,
            occupancy,
        };
        turn_order::derive(
            &mut state.own.worms,
            state.own.current,
            &mut state.opponent.worms,
            state.opponent.current,
        );
        Ok(state)
    }

    /// One-based index of the round.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Consecutive do-nothing commands issued by this bot.
    #[must_use]
    pub const fn consecutive_do_nothings(&self) -> u32 {
        self.consecutive_do_nothings
    }

    /// Score of the provided side.
    #[must_use]
    pub fn score(&self, side: Side) -> i32 {
        self.team(side).score
    }

    /// Reselections the provided side has left.
    #[must_use]
    pub fn selections_remaining(&self, side: Side) -> u32 {
        self.team(side).selections_remaining
    }

    /// Command the provided side issued last round, when reported.
    #[must_use]
    pub fn previous_command(&self, side: Side) -> Option<&str> {
        self.team(side).previous_command.as_deref()
    }

    /// All units of a side in index order, dead ones included.
    #[must_use]
    pub fn worms(&self, side: Side) -> &[Worm] {
        &self.team(side).worms
    }

    /// Living units of a side in index order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Worm> + '_ {
        self.worms(side).iter().filter(|worm| worm.is_alive())
    }

    /// The unit acting for a side this round.
    #[must_use]
    pub fn active_worm(&self, side: Side) -> &Worm {
        let team = self.team(side);
        &team.worms[usize::from(team.current)]
    }

    /// Looks up a unit by identity.
    #[must_use]
    pub fn worm(&self, id: WormId) -> Option<&Worm> {
        self.worms(id.side()).get(usize::from(id.index()))
    }

    /// Living unit standing on the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, coord: Coord) -> Option<&Worm> {
        self.occupancy
            .get(&coord)
            .and_then(|&id| self.worm(id))
    }

    /// Materialised cell at the provided coordinate. Deep space yields `None`.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Reports whether the coordinate lies on the map.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Every materialised cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells.iter().map(|(&coord, cell)| (coord, cell))
    }

    /// Units of a side that get to act within the next `turns` turns of that
    /// side, starting with its current unit, skipping units still frozen when
    /// their turn comes around.
    #[must_use]
    pub fn acting_within(&self, side: Side, turns: u32) -> Vec<WormId> {
        let team = self.team(side);
        turn_order::acting_within(&team.worms, team.current, turns)
    }

    fn team(&self, side: Side) -> &Team {
        match side {
            Side::Own => &self.own,
            Side::Opponent => &self.opponent,
        }
    }
}

fn build_team(
    side: Side,
    snapshot: SideSnapshot,
    ledger: &AmmoLedger,
) -> Result<Team, SnapshotError> {
    let count = snapshot.worms.len();
    if count == 0 {
        return Err(SnapshotError::NoWorms { side });
    }
    if count > usize::from(u8::MAX) {
        return Err(SnapshotError::TooManyWorms { side, count });
    }
    if usize::from(snapshot.current_worm) >= count {
        return Err(SnapshotError::CurrentWormOutOfRange {
            side,
            index: snapshot.current_worm,
            count,
        });
    }

    let worms = snapshot
        .worms
        .into_iter()
        .zip(0u8..)
        .map(|(worm, index)| {
            let (bananas, snowballs) = match side {
                Side::Own => (worm.bananas.unwrap_or(0), worm.snowballs.unwrap_or(0)),
                Side::Opponent => (
                    ledger.remaining_bananas(worm.profession),
                    ledger.remaining_snowballs(worm.profession),
                ),
            };
            Worm {
                id: WormId::new(side, index),
                position: worm.position,
                health: worm.health,
                profession: worm.profession,
                bananas,
                snowballs,
                rounds_until_unfrozen: worm.rounds_until_unfrozen,
                active: index == snapshot.current_worm,
                acts_before_next_turn: false,
                turns_till_active: None,
            }
        })
        .collect();

    Ok(Team {
        score: snapshot.score,
        current: snapshot.current_worm,
        selections_remaining: snapshot.selections_remaining,
        previous_command: snapshot.previous_command,
        worms,
    })
}

/// Read-only queries over a round state that depend on the round clock or on
/// the lava ring.
pub mod query {
    use std::collections::BTreeSet;

    use worms_core::{Coord, Direction, Terrain, MAP_CENTRE};

    use super::RoundState;

    /// First round in which the lava ring is treated as a hazard.
    pub const HAZARD_START_ROUND: u32 = 100;

    /// Round from which every non-air cell counts as a hazard.
    pub const FULL_HAZARD_ROUND: u32 = 302;

    /// Radius reported when the map carries no lava yet. Larger than any map.
    pub const UNBOUNDED_LAVA_RADIUS: f64 = 1000.0;

    /// Cells that are, or are about to become, lethal this round.
    ///
    /// Before [`HAZARD_START_ROUND`] nothing is hazardous. From
    /// [`FULL_HAZARD_ROUND`] onward every non-air cell is. In between, lava
    /// cells and their eight neighbours are.
    #[must_use]
    pub fn hazard_cells(state: &RoundState) -> BTreeSet<Coord> {
        let round = state.round();
        if round < HAZARD_START_ROUND {
            return BTreeSet::new();
        }

        if round >= FULL_HAZARD_ROUND {
            return state
                .cells()
                .filter(|(_, cell)| cell.terrain != Terrain::Air)
                .map(|(coord, _)| coord)
                .collect();
        }

        let mut hazards = BTreeSet::new();
        for (coord, cell) in state.cells() {
            if cell.terrain != Terrain::Lava {
                continue;
            }
            let _ = hazards.insert(coord);
            for direction in Direction::ALL {
                let neighbour = coord.step(direction);
                if state.contains(neighbour) {
                    let _ = hazards.insert(neighbour);
                }
            }
        }
        hazards
    }

    /// Distance from the map centre to the nearest lava cell.
    #[must_use]
    pub fn min_lava_radius(state: &RoundState) -> f64 {
        state
            .cells()
            .filter(|(_, cell)| cell.terrain == Terrain::Lava)
            .map(|(coord, _)| coord.distance(MAP_CENTRE))
            .fold(None, |nearest: Option<f64>, distance| {
                Some(nearest.map_or(distance, |current| current.min(distance)))
            })
            .unwrap_or(UNBOUNDED_LAVA_RADIUS)
    }

    /// Dirt cells strictly inside the lava ring, in row-major order.
    #[must_use]
    pub fn buried_dirt(state: &RoundState) -> Vec<Coord> {
        let radius = min_lava_radius(state);
        state
            .cells()
            .filter(|(coord, cell)| {
                cell.terrain == Terrain::Dirt && coord.distance(MAP_CENTRE) < radius
            })
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Reports whether any dirt is left to dig inside the lava ring.
    #[must_use]
    pub fn dirt_remains(state: &RoundState) -> bool {
        !buried_dirt(state).is_empty()
    }
}
