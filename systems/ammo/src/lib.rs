#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Infers how much special ammunition the opponent has spent.
//!
//! The engine never reports opponent ammunition, but it does echo the command
//! the opponent issued in the previous round. Every throw seen there is
//! recorded in the [`AmmoLedger`] carried into the next round.

use worms_core::AmmoLedger;

/// Stateless ledger updater applied once per round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AmmoTracking;

impl AmmoTracking {
    /// Returns `ledger` advanced by whatever `previous_command` threw.
    #[must_use]
    pub fn observe(ledger: AmmoLedger, previous_command: Option<&str>) -> AmmoLedger {
        let Some(command) = previous_command else {
            return ledger;
        };

        let mut next = ledger;
        if command.contains("banana") {
            next = next.record_banana();
            tracing::debug!(
                target: "worms::ammo",
                used = next.bananas_used(),
                "ammo.opponent_banana"
            );
        }
        if command.contains("snowball") {
            next = next.record_snowball();
            tracing::debug!(
                target: "worms::ammo",
                used = next.snowballs_used(),
                "ammo.opponent_snowball"
            );
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::AmmoTracking;
    use worms_core::AmmoLedger;

    #[test]
    fn ignores_commands_without_throws() {
        let ledger = AmmoLedger::with_usage(1, 1);
        assert_eq!(AmmoTracking::observe(ledger, None), ledger);
        assert_eq!(AmmoTracking::observe(ledger, Some("shoot NW")), ledger);
        assert_eq!(AmmoTracking::observe(ledger, Some("move 3 4")), ledger);
    }

    #[test]
    fn counts_throws_behind_a_selection() {
        let ledger = AmmoTracking::observe(AmmoLedger::new(), Some("select 2;snowball 10 11"));
        assert_eq!(ledger, AmmoLedger::with_usage(0, 1));
    }
}
