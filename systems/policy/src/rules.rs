//! The ordered rule list. The first rule that yields a move decides the turn.

use rand::seq::SliceRandom;
use worms_core::{Action, Coord, Move, Side};
use worms_system_danger::{dangerous_cells, threats_to, DangerQuery};
use worms_system_movegen::{banana_dig, banana_targets, snowball_target, valid_moves, LavaCrossing};
use worms_world::query;

use crate::{escape, reselect, targeting, turn::Turn};

/// A single guarded step of the decision procedure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Leave a cell that is, or is about to become, lava.
    HazardEscape,
    /// Step onto an adjacent powerup.
    Powerup,
    /// React to an enemy that can hit the active unit this round.
    DangerResponse,
    /// Take a shot that is cheap or favourable even without a threat.
    OpportunisticShot,
    /// Move a teammate that is about to be hit.
    Reselection,
    /// Freeze opposing units.
    Snowball,
    /// Throw a banana at opposing units.
    AttackingBanana,
    /// Throw a banana to clear dirt.
    BananaDig,
    /// Dig where the opened cell does not expose the active unit.
    SafeDigging,
    /// Move without stepping into danger, towards the remaining dirt.
    SafeMovement,
    /// Play for the win once the dirt is gone.
    Endgame,
}

impl Rule {
    /// Every rule in evaluation order.
    pub const ALL: [Rule; 11] = [
        Rule::HazardEscape,
        Rule::Powerup,
        Rule::DangerResponse,
        Rule::OpportunisticShot,
        Rule::Reselection,
        Rule::Snowball,
        Rule::AttackingBanana,
        Rule::BananaDig,
        Rule::SafeDigging,
        Rule::SafeMovement,
        Rule::Endgame,
    ];

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Rule::HazardEscape => "hazard_escape",
            Rule::Powerup => "powerup",
            Rule::DangerResponse => "danger_response",
            Rule::OpportunisticShot => "opportunistic_shot",
            Rule::Reselection => "reselection",
            Rule::Snowball => "snowball",
            Rule::AttackingBanana => "attacking_banana",
            Rule::BananaDig => "banana_dig",
            Rule::SafeDigging => "safe_digging",
            Rule::SafeMovement => "safe_movement",
            Rule::Endgame => "endgame",
        }
    }

    pub(crate) fn apply(self, turn: &mut Turn<'_>) -> Option<Move> {
        match self {
            Rule::HazardEscape => hazard_escape(turn),
            Rule::Powerup => powerup(turn),
            Rule::DangerResponse => danger_response(turn),
            Rule::OpportunisticShot => targeting::shot_response(turn),
            Rule::Reselection => reselect::reselection(turn),
            Rule::Snowball => snowball_target(turn.state, turn.subject)
                .filter(|cell| !turn.is_hazard(*cell))
                .map(|cell| Move::new(Action::Snowball(cell))),
            Rule::AttackingBanana => attacking_banana(turn),
            Rule::BananaDig => banana_dig(turn.state, turn.subject)
                .filter(|cell| !turn.is_hazard(*cell))
                .map(|cell| Move::new(Action::Banana(cell))),
            Rule::SafeDigging => safe_digging(turn),
            Rule::SafeMovement => safe_movement(turn),
            Rule::Endgame => Some(endgame(turn)),
        }
    }
}

fn hazard_escape(turn: &Turn<'_>) -> Option<Move> {
    if !turn.is_hazard(turn.subject.position) {
        return None;
    }

    let step = |cells: &[Coord]| {
        escape::closest_to_centre(cells, &turn.danger).map(|cell| Move::new(Action::Move(cell)))
    };

    let moves = targets_of(turn, LavaCrossing::Forbidden, |action| {
        matches!(action, Action::Move(_))
    });
    let cold: Vec<Coord> = moves
        .iter()
        .copied()
        .filter(|cell| !turn.is_hazard(*cell))
        .collect();
    if let Some(chosen) = step(&cold).or_else(|| step(&moves)) {
        return Some(chosen);
    }

    let through_lava = targets_of(turn, LavaCrossing::Permitted, |action| {
        matches!(action, Action::Move(_))
    });
    if let Some(chosen) = step(&through_lava) {
        return Some(chosen);
    }

    let digs = targets_of(turn, LavaCrossing::Permitted, |action| {
        matches!(action, Action::Dig(_))
    });
    if let Some(cell) = escape::closest_to_centre(&digs, &turn.danger) {
        return Some(Move::new(Action::Dig(cell)));
    }

    Some(targeting::shoot_or_wait(turn))
}

fn powerup(turn: &Turn<'_>) -> Option<Move> {
    turn.moves()
        .into_iter()
        .find(|cell| turn.state.cell(*cell).is_some_and(|found| found.powerup))
        .map(|cell| Move::new(Action::Move(cell)))
}

fn danger_response(turn: &Turn<'_>) -> Option<Move> {
    let threats = threats_to(turn.state, turn.subject);
    if threats.is_empty() {
        return None;
    }
    tracing::debug!(target: "worms::policy", threats = threats.len(), "policy.threatened");

    if turn.shots.is_empty() {
        return Some(escape::run_away(turn));
    }
    Some(targeting::fight_or_flee(turn))
}

fn attacking_banana(turn: &Turn<'_>) -> Option<Move> {
    if !turn.config.attack_with_bananas {
        return None;
    }
    banana_targets(turn.state, turn.subject)
        .into_iter()
        .find(|candidate| !turn.is_hazard(candidate.target))
        .map(|candidate| Move::new(Action::Banana(candidate.target)))
}

fn safe_digging(turn: &mut Turn<'_>) -> Option<Move> {
    if !query::dirt_remains(turn.state) {
        return None;
    }

    let digs = turn.digs();
    let safe: Vec<Coord> = digs
        .iter()
        .copied()
        .filter(|&cell| {
            let opened = DangerQuery::against(turn.subject.id).with_dug(Some(cell));
            !dangerous_cells(turn.state, &opened).contains(&turn.subject.position)
        })
        .collect();
    if safe.len() != digs.len() {
        tracing::debug!(
            target: "worms::policy",
            dropped = digs.len() - safe.len(),
            "safe_digging.exposed"
        );
    }

    safe.choose(&mut turn.rng)
        .map(|&cell| Move::new(Action::Dig(cell)))
}

fn safe_movement(turn: &mut Turn<'_>) -> Option<Move> {
    let moves = turn.moves();
    let safe = turn.safe(&moves);

    if safe.is_empty() {
        if turn.state.consecutive_do_nothings() == turn.config.max_do_nothings {
            tracing::debug!(target: "worms::policy", "safe_movement.forced");
            return Some(
                moves
                    .choose(&mut turn.rng)
                    .map_or_else(Move::nothing, |&cell| Move::new(Action::Move(cell))),
            );
        }
        tracing::debug!(target: "worms::policy", "safe_movement.holding");
        return Some(Move::nothing());
    }

    if !query::dirt_remains(turn.state) {
        return None;
    }
    escape::weight_to_dirt(turn.state, &safe).map(|cell| Move::new(Action::Move(cell)))
}

fn endgame(turn: &Turn<'_>) -> Move {
    let state = turn.state;
    let moves = turn.moves();

    if state.score(Side::Own) < state.score(Side::Opponent) {
        if let Some(shot) = targeting::shoot_lowest_health(turn) {
            return shot;
        }
        let weakest = state
            .living(Side::Opponent)
            .min_by_key(|worm| worm.health)
            .map(|worm| worm.position);
        return weakest
            .and_then(|target| escape::nearest_to(target, &moves))
            .map_or_else(Move::nothing, |cell| Move::new(Action::Move(cell)));
    }

    if !turn.shots.is_empty() {
        return targeting::fight_or_flee(turn);
    }
    escape::furthest_from_opponents(state, &moves)
        .map_or_else(Move::nothing, |cell| Move::new(Action::Move(cell)))
}

fn targets_of(
    turn: &Turn<'_>,
    lava: LavaCrossing,
    keep: impl Fn(&Action) -> bool,
) -> Vec<Coord> {
    valid_moves(turn.state, turn.subject, lava)
        .iter()
        .filter(|action| keep(action))
        .filter_map(Action::target)
        .collect()
}
