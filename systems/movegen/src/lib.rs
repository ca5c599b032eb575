#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enumerates the legal actions available to a unit and ranks its area-weapon
//! targets.

use worms_core::{Action, Coord, Direction, Terrain};
use worms_system_spatial::{banana_footprint, shots, snowball_footprint, throw_targets};
use worms_world::{RoundState, Worm};

/// Smallest total opposing damage that justifies an attacking banana.
pub const BANANA_DAMAGE_MIN: u32 = 20;

/// Smallest number of dirt cells a banana must clear to be thrown as a digger.
pub const BANANA_DIG_MINIMUM: u32 = 8;

/// Whether lava cells may be entered by a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LavaCrossing {
    /// Lava blocks movement.
    Forbidden,
    /// Lava is entered like air. Used only when every other cell is worse.
    Permitted,
}

/// An attacking banana target and the opposing damage it deals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BananaTarget {
    /// Cell the banana is thrown at.
    pub target: Coord,
    /// Total damage dealt to opposing units.
    pub damage: u32,
}

/// Nothing, plus every dig and step into the eight neighbouring cells.
///
/// Dirt neighbours yield a dig. Air neighbours, and lava neighbours when
/// crossing is permitted, yield a move if no living unit stands there.
#[must_use]
pub fn valid_moves(state: &RoundState, subject: &Worm, lava: LavaCrossing) -> Vec<Action> {
    let mut actions = vec![Action::Nothing];

    for direction in Direction::ALL {
        let neighbour = subject.position.step(direction);
        let Some(cell) = state.cell(neighbour) else {
            continue;
        };

        match cell.terrain {
            Terrain::Dirt => actions.push(Action::Dig(neighbour)),
            Terrain::Air => {
                if state.occupant(neighbour).is_none() {
                    actions.push(Action::Move(neighbour));
                }
            }
            Terrain::Lava => {
                if lava == LavaCrossing::Permitted && state.occupant(neighbour).is_none() {
                    actions.push(Action::Move(neighbour));
                }
            }
            Terrain::DeepSpace => {}
        }
    }

    actions
}

/// Every legal action of `subject`: the movement options, one shot per
/// direction with an opposing target, the attacking banana targets and the
/// best snowball target.
#[must_use]
pub fn legal_actions(state: &RoundState, subject: &Worm) -> Vec<Action> {
    let mut actions = valid_moves(state, subject, LavaCrossing::Forbidden);
    actions.extend(
        shots(state, subject)
            .into_iter()
            .map(|(direction, _)| Action::Shoot(direction)),
    );
    actions.extend(
        banana_targets(state, subject)
            .into_iter()
            .map(|candidate| Action::Banana(candidate.target)),
    );
    actions.extend(snowball_target(state, subject).map(Action::Snowball));
    actions
}

/// Banana targets that hurt no friendly unit and deal at least
/// [`BANANA_DAMAGE_MIN`] to the other side, most damaging first.
#[must_use]
pub fn banana_targets(state: &RoundState, subject: &Worm) -> Vec<BananaTarget> {
    if subject.bananas == 0 {
        return Vec::new();
    }

    let mut targets: Vec<BananaTarget> = throw_targets(state, subject.position)
        .filter_map(|target| {
            let mut friendly = 0;
            let mut opposing = 0;
            for (coord, damage) in banana_footprint(state, target) {
                match state.occupant(coord) {
                    Some(worm) if worm.side() == subject.side() => friendly += damage,
                    Some(_) => opposing += damage,
                    None => {}
                }
            }

            (friendly == 0 && opposing >= BANANA_DAMAGE_MIN).then_some(BananaTarget {
                target,
                damage: opposing,
            })
        })
        .collect();

    targets.sort_by(|a, b| b.damage.cmp(&a.damage));
    targets
}

/// Best snowball target: hits no friendly unit and freezes the most thawed
/// opposing units, preferring a cell that itself holds an opposing unit.
#[must_use]
pub fn snowball_target(state: &RoundState, subject: &Worm) -> Option<Coord> {
    if subject.snowballs == 0 {
        return None;
    }

    let mut best: Option<(Coord, (usize, bool))> = None;
    for target in throw_targets(state, subject.position) {
        let mut friendly = 0;
        let mut opposing = 0;
        for coord in snowball_footprint(state, target) {
            match state.occupant(coord) {
                Some(worm) if worm.side() == subject.side() => friendly += 1,
                Some(worm) if !worm.is_frozen() => opposing += 1,
                _ => {}
            }
        }
        if friendly > 0 || opposing == 0 {
            continue;
        }

        let centred = state
            .occupant(target)
            .is_some_and(|worm| worm.side() != subject.side());
        let key = (opposing, centred);
        if best.map_or(true, |(_, best_key)| key > best_key) {
            best = Some((target, key));
        }
    }

    best.map(|(target, _)| target)
}

/// Banana thrown purely to excavate: hurts no friendly unit and clears at
/// least [`BANANA_DIG_MINIMUM`] dirt cells, choosing the most dirt.
#[must_use]
pub fn banana_dig(state: &RoundState, subject: &Worm) -> Option<Coord> {
    if subject.bananas == 0 {
        return None;
    }

    let mut best: Option<(Coord, u32)> = None;
    for target in throw_targets(state, subject.position) {
        let mut friendly_hit = false;
        let mut dirt = 0;
        for (coord, _) in banana_footprint(state, target) {
            if state
                .occupant(coord)
                .is_some_and(|worm| worm.side() == subject.side())
            {
                friendly_hit = true;
            }
            if state
                .cell(coord)
                .is_some_and(|cell| cell.terrain == Terrain::Dirt)
            {
                dirt += 1;
            }
        }

        if friendly_hit || dirt < BANANA_DIG_MINIMUM {
            continue;
        }
        if best.map_or(true, |(_, most)| dirt > most) {
            best = Some((target, dirt));
        }
    }

    best.map(|(target, _)| target)
}
