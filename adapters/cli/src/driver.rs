//! Round loop: read a round number, decide, print the command.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use worms_core::{AmmoLedger, Move};
use worms_system_ammo::AmmoTracking;
use worms_system_policy::DecisionPolicy;
use worms_world::RoundState;

use crate::{config::BotConfig, engine_state};

/// Plays one match, carrying the opponent ammo ledger from round to round.
pub(crate) struct Driver {
    policy: DecisionPolicy,
    rounds_dir: PathBuf,
    time_budget: Duration,
    ledger: AmmoLedger,
}

impl Driver {
    pub(crate) fn new(config: &BotConfig) -> Self {
        Self {
            policy: DecisionPolicy::new(config.policy.clone()),
            rounds_dir: config.rounds_dir.clone(),
            time_budget: config.time_budget(),
            ledger: AmmoLedger::new(),
        }
    }

    /// Answers every round number read from `input` until end of input.
    ///
    /// A round that cannot be played is logged and skipped without printing
    /// anything.
    pub(crate) fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read round number")?;
            let round = line.trim();
            if round.is_empty() {
                continue;
            }

            match self.play_round(round) {
                Ok(chosen) => {
                    writeln!(output, "C;{round};{chosen}").context("failed to write command")?;
                    output.flush().context("failed to flush command")?;
                }
                Err(error) => {
                    tracing::error!(
                        target: "worms::driver",
                        round,
                        error = %format!("{error:#}"),
                        "driver.round_skipped"
                    );
                }
            }
        }

        tracing::info!(target: "worms::driver", "driver.input_closed");
        Ok(())
    }

    fn play_round(&mut self, round: &str) -> Result<Move> {
        let path = self.rounds_dir.join(round).join("state.json");
        let snapshot = engine_state::load(&path)?;
        let previous = snapshot.opponent.previous_command.as_deref();
        let ledger = AmmoTracking::observe(self.ledger, previous);
        let state = RoundState::new(snapshot, &ledger).context("snapshot failed validation")?;

        let started = Instant::now();
        let chosen = self.policy.decide(&state);
        let elapsed = started.elapsed();
        if elapsed > self.time_budget {
            tracing::warn!(
                target: "worms::driver",
                round,
                elapsed = ?elapsed,
                budget = ?self.time_budget,
                "driver.over_budget"
            );
        }

        self.ledger = ledger;
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Driver;
    use crate::config::BotConfig;
    use worms_core::AmmoLedger;

    fn fixture_driver() -> Driver {
        Driver::new(&BotConfig {
            rounds_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rounds"),
            ..BotConfig::default()
        })
    }

    #[test]
    fn answers_each_round_and_skips_missing_ones() {
        let mut driver = fixture_driver();
        let mut output = Vec::new();
        driver
            .run("1\n\n7\n2\n".as_bytes(), &mut output)
            .expect("loop ends cleanly");

        let text = String::from_utf8(output).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("C;1;"));
        assert!(lines[1].starts_with("C;2;"));
        assert_eq!(driver.ledger, AmmoLedger::with_usage(1, 0));
    }

    #[test]
    fn replaying_a_match_repeats_every_command() {
        let play = || {
            let mut output = Vec::new();
            fixture_driver()
                .run("1\n2\n".as_bytes(), &mut output)
                .expect("loop ends cleanly");
            output
        };
        assert_eq!(play(), play());
    }
}
