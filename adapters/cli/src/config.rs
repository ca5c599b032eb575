//! Bot configuration loaded from an optional TOML file.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use worms_system_policy::PolicyConfig;

/// Settings of the bot process. Every field falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct BotConfig {
    /// Directory holding one `<round>/state.json` per round.
    pub(crate) rounds_dir: PathBuf,
    /// Decisions slower than this are reported.
    pub(crate) time_budget_ms: u64,
    /// Tunables handed to the decision policy.
    pub(crate) policy: PolicyConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rounds_dir: PathBuf::from("./rounds"),
            time_budget_ms: 1000,
            policy: PolicyConfig::default(),
        }
    }
}

impl BotConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("config is not valid toml")
    }

    pub(crate) fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::BotConfig;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = BotConfig::parse(
            r#"
            time_budget_ms = 800

            [policy]
            attack_with_bananas = true
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.rounds_dir, PathBuf::from("./rounds"));
        assert_eq!(config.time_budget_ms, 800);
        assert!(config.policy.attack_with_bananas);
        assert_eq!(config.policy.max_do_nothings, 11);
    }

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(BotConfig::parse("").expect("valid toml"), BotConfig::default());
        assert_eq!(BotConfig::load(None).expect("defaults"), BotConfig::default());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(BotConfig::parse("time_budget_ms = \"soon\"").is_err());
    }
}
