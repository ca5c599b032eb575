//! Handing the turn to a teammate that is about to be shot.

use worms_core::{Action, Coord, Move, Side};
use worms_system_danger::{dangerous_cells, DangerQuery};
use worms_system_movegen::{valid_moves, LavaCrossing};

use crate::{escape, targeting, turn::Turn};

/// Selects the weakest idle teammate that stands in danger before its own
/// turn comes around and can step out of danger right now.
pub(crate) fn reselection(turn: &Turn<'_>) -> Option<Move> {
    let state = turn.state;
    if state.selections_remaining(Side::Own) == 0 {
        return None;
    }

    let mut best: Option<(i32, Move)> = None;
    for worm in state.living(Side::Own) {
        if worm.active || worm.is_frozen() {
            continue;
        }
        if targeting::should_engage(state, worm) {
            tracing::debug!(target: "worms::policy", worm = worm.id.index(), "reselect.holding");
            continue;
        }

        let window = worm.turns_till_active.unwrap_or(0);
        let imminent = DangerQuery::against(worm.id)
            .with_enemies(state.acting_within(Side::Opponent, window));
        if !dangerous_cells(state, &imminent).contains(&worm.position) {
            continue;
        }

        let danger = dangerous_cells(state, &DangerQuery::against(worm.id));
        let escapes: Vec<Coord> = valid_moves(state, worm, LavaCrossing::Forbidden)
            .into_iter()
            .filter_map(|action| match action {
                Action::Move(cell) => Some(cell),
                _ => None,
            })
            .filter(|cell| !turn.is_hazard(*cell) && !danger.contains(cell))
            .collect();
        let Some(cell) = escape::furthest_from_opponents(state, &escapes) else {
            continue;
        };

        let candidate = Move::new(Action::Move(cell)).with_select(worm.id.index());
        if best.map_or(true, |(health, _)| worm.health < health) {
            best = Some((worm.health, candidate));
        }
    }

    best.map(|(_, chosen)| chosen)
}
