#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule-ordered decision policy for the own active unit.
//!
//! The policy evaluates [`Rule::ALL`] in order against a fresh round state.
//! The first rule that yields a move decides the turn and `nothing` is the
//! fallback. Random choices draw from a ChaCha generator seeded with the
//! configured seed and the round index, so a decision depends only on the
//! round state and the configuration.

use serde::{Deserialize, Serialize};
use worms_core::{Move, Side};
use worms_world::RoundState;

mod escape;
mod reselect;
mod rules;
mod targeting;
mod turn;

pub use rules::Rule;

use turn::Turn;

/// Do-nothing streak after which the engine disqualifies a bot.
pub const DEFAULT_MAX_DO_NOTHINGS: u32 = 11;

/// Tunables of the decision policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Seed mixed with the round index for every random choice.
    pub seed: u64,
    /// Consecutive do-nothing count at which a move is forced even into danger.
    pub max_do_nothings: u32,
    /// Whether bananas are thrown at opponents and not only used for digging.
    pub attack_with_bananas: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            seed: 2019,
            max_do_nothings: DEFAULT_MAX_DO_NOTHINGS,
            attack_with_bananas: false,
        }
    }
}

/// Decision policy that picks one move per round.
#[derive(Clone, Debug, Default)]
pub struct DecisionPolicy {
    config: PolicyConfig,
}

impl DecisionPolicy {
    /// Creates a policy with the provided configuration.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Configuration the policy runs with.
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Chooses the move for the own side this round.
    #[must_use]
    pub fn decide(&self, state: &RoundState) -> Move {
        if !state.active_worm(Side::Own).is_alive() {
            tracing::warn!(
                target: "worms::policy",
                round = state.round(),
                "policy.active_worm_dead"
            );
            return Move::nothing();
        }

        let mut turn = Turn::new(state, &self.config);
        for rule in Rule::ALL {
            if let Some(chosen) = rule.apply(&mut turn) {
                tracing::debug!(
                    target: "worms::policy",
                    rule = rule.name(),
                    command = %chosen,
                    "policy.decided"
                );
                return chosen;
            }
        }

        Move::nothing()
    }
}

#[cfg(test)]
mod tests {
    use super::{DecisionPolicy, PolicyConfig, Rule};
    use worms_core::{Coord, Move, Profession, Side};
    use worms_world::scaffolding::SnapshotBuilder;

    #[test]
    fn rules_are_listed_once_each() {
        let mut names: Vec<_> = Rule::ALL.iter().map(|rule| rule.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Rule::ALL.len());
        assert_eq!(Rule::ALL[0], Rule::HazardEscape);
        assert_eq!(Rule::ALL[Rule::ALL.len() - 1], Rule::Endgame);
    }

    #[test]
    fn dead_active_worm_does_nothing() {
        let state = SnapshotBuilder::new(10, 10)
            .worm(Side::Own, Coord::new(2, 2), Profession::Commando)
            .health(Side::Own, 0, 0)
            .worm(Side::Opponent, Coord::new(7, 7), Profession::Commando)
            .build()
            .expect("valid snapshot");

        assert_eq!(DecisionPolicy::default().decide(&state), Move::nothing());
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config = PolicyConfig {
            attack_with_bananas: true,
            ..PolicyConfig::default()
        };
        assert_eq!(config.max_do_nothings, 11);
        assert_eq!(DecisionPolicy::new(config.clone()).config(), &config);
    }
}
