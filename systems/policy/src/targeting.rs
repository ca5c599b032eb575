//! Rifle decisions: whom to shoot and whether to stand and fight.

use worms_core::{Action, Move};
use worms_system_spatial::shots;
use worms_world::{RoundState, Worm};

use crate::{escape, turn::Turn};

/// Health below which a unit never volunteers for a duel.
const ENGAGE_MIN_HEALTH: i32 = 8;

/// Shoots the weakest target in view, first direction on ties.
pub(crate) fn shoot_lowest_health(turn: &Turn<'_>) -> Option<Move> {
    turn.shots
        .iter()
        .min_by_key(|(_, target)| target.health)
        .map(|(direction, _)| Move::new(Action::Shoot(*direction)))
}

/// Shoots the weakest target, or does nothing when nothing is in view.
pub(crate) fn shoot_or_wait(turn: &Turn<'_>) -> Move {
    shoot_lowest_health(turn).unwrap_or_else(Move::nothing)
}

/// Whether `unit` should trade fire with the single opponent it can hit.
///
/// Only worth it while ahead on points, healthy, and at least as healthy as
/// the target. An even trade is refused when the own side is down to its last
/// unit against several.
pub(crate) fn should_engage(state: &RoundState, unit: &Worm) -> bool {
    let targets = shots(state, unit);
    let [(_, target)] = targets.as_slice() else {
        return false;
    };

    if state.score(unit.side()) <= state.score(unit.side().opposite()) {
        return false;
    }
    if unit.health < ENGAGE_MIN_HEALTH {
        return false;
    }

    if target.health < unit.health {
        return true;
    }
    let outnumbered = state.living(unit.side()).count() == 1
        && state.living(unit.side().opposite()).count() > 1;
    target.health == unit.health && !outnumbered
}

/// Shoots when the target cannot answer before the subject acts again, or when
/// engaging is favourable. `None` when neither holds.
pub(crate) fn shot_response(turn: &Turn<'_>) -> Option<Move> {
    if turn.shots.is_empty() {
        return None;
    }

    if !turn.shots.iter().any(|(_, target)| target.acts_before_next_turn) {
        tracing::debug!(target: "worms::policy", "policy.pot_shot");
        return shoot_lowest_health(turn);
    }
    if should_engage(turn.state, turn.subject) {
        tracing::debug!(target: "worms::policy", "policy.engage");
        return shoot_lowest_health(turn);
    }
    None
}

/// Shot response with retreat as the fallback.
pub(crate) fn fight_or_flee(turn: &Turn<'_>) -> Move {
    shot_response(turn).unwrap_or_else(|| escape::run_away(turn))
}
