#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line bot that plays a worms match against the game engine.
//!
//! The engine writes `rounds/<round>/state.json` and then sends the round
//! number on stdin; the bot answers with `C;<round>;<command>` on stdout.
//! Logs go to stderr so stdout only ever carries commands.

mod config;
mod driver;
mod engine_state;

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use worms_core::{AmmoLedger, STARTING_BANANAS};
use worms_system_policy::DecisionPolicy;
use worms_world::RoundState;

use crate::{config::BotConfig, driver::Driver};

#[derive(Parser, Debug)]
#[command(name = "worms-bot", about = "Rule-based worms bot", long_about = None)]
struct Cli {
    /// Directory holding the engine's per-round state files.
    #[arg(long)]
    rounds_dir: Option<PathBuf>,
    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide for a single state file and print the command.
    Inspect {
        /// Path to a `state.json`.
        state: PathBuf,
        /// Bananas the opponent agent still holds.
        #[arg(long, default_value_t = STARTING_BANANAS)]
        bananas: u32,
    },
}

/// Entry point for the worms bot.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = BotConfig::load(cli.config.as_deref())?;
    if let Some(rounds_dir) = cli.rounds_dir {
        config.rounds_dir = rounds_dir;
    }

    match cli.command {
        Some(Command::Inspect { state, bananas }) => inspect(&config, &state, bananas),
        None => {
            tracing::info!(
                target: "worms::driver",
                rounds_dir = %config.rounds_dir.display(),
                "driver.started"
            );
            Driver::new(&config).run(io::stdin().lock(), io::stdout().lock())
        }
    }
}

fn inspect(config: &BotConfig, path: &Path, bananas: u32) -> Result<()> {
    let snapshot = engine_state::load(path)?;
    let ledger = AmmoLedger::with_usage(STARTING_BANANAS.saturating_sub(bananas), 0);
    let state = RoundState::new(snapshot, &ledger).context("snapshot failed validation")?;
    println!("{}", DecisionPolicy::new(config.policy.clone()).decide(&state));
    Ok(())
}
