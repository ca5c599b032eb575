//! Turn rotation bookkeeping derived once per round.

use worms_core::WormId;

use crate::Worm;

/// Marks which opponent units act before the own side cycles back to its
/// current unit, and how many turns each own unit waits before acting.
///
/// Both sides rotate through their living units in index order. One full own
/// rotation lasts as many turns as the own side has living units; during that
/// window an opponent unit acts if it is alive and thawed by the time the
/// rotation reaches it.
pub(crate) fn derive(
    own: &mut [Worm],
    own_current: u8,
    opponent: &mut [Worm],
    opponent_current: u8,
) {
    let own_living = own.iter().filter(|worm| worm.is_alive()).count();
    let mut own_cursor = usize::from(own_current);
    let mut opponent_cursor = usize::from(opponent_current);

    for turn in (0u32..).take(own_living) {
        let candidate = &mut opponent[opponent_cursor];
        if candidate.is_alive() && candidate.rounds_until_unfrozen <= turn {
            candidate.acts_before_next_turn = true;
        }

        own[own_cursor].turns_till_active = Some(turn);

        opponent_cursor = next_living(opponent, opponent_cursor);
        own_cursor = next_living(own, own_cursor);
    }
}

/// Identities of the units that act within the next `turns` turns of their
/// side, starting from the current unit.
pub(crate) fn acting_within(worms: &[Worm], current: u8, turns: u32) -> Vec<WormId> {
    let mut cursor = usize::from(current);
    let mut acting = Vec::new();

    for turn in 0..turns {
        let worm = &worms[cursor];
        if worm.is_alive() && worm.rounds_until_unfrozen <= turn && !acting.contains(&worm.id) {
            acting.push(worm.id);
        }
        cursor = next_living(worms, cursor);
    }

    acting
}

/// Index of the next living unit after `from`, wrapping around. Returns `from`
/// when no other unit is alive.
fn next_living(worms: &[Worm], from: usize) -> usize {
    let count = worms.len();
    let mut cursor = from;
    for _ in 0..count {
        cursor = (cursor + 1) % count;
        if worms[cursor].is_alive() {
            return cursor;
        }
    }
    from
}
