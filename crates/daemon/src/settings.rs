//! Daemon settings
//!
//! Built-in defaults overlaid with `LINEUP_*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment};
use lineup_core::EngineConfig;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "LINEUP";

const DEFAULT_DB_PATH: &str = "~/.lineup/lineup.db";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: i64 = 9530;
const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// Entry max age in seconds; `<= 0` disables pruning
    pub max_age_secs: i64,
    /// Visible messages allowed below the display before it is reposted
    pub repost_threshold: i64,
    pub pop_max_attempts: usize,
    pub slack_token: Option<String>,
    pub slack_api_base: String,
    pub log_format: String,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self> {
        let engine = EngineConfig::default();

        Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("rpc_host", DEFAULT_RPC_HOST)?
            .set_default("rpc_port", DEFAULT_RPC_PORT)?
            .set_default("max_age_secs", 0_i64)?
            .set_default("repost_threshold", engine.repost_threshold)?
            .set_default("pop_max_attempts", engine.pop_max_attempts as i64)?
            .set_default("slack_api_base", DEFAULT_SLACK_API_BASE)?
            .set_default("log_format", "pretty")?
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_max_age_secs(self.max_age_secs)
            .with_repost_threshold(self.repost_threshold)
            .with_pop_max_attempts(self.pop_max_attempts)
    }

    /// Tilde-expanded SQLite path
    pub fn db_path(&self) -> String {
        shellexpand::tilde(&self.db_path).into_owned()
    }

    pub fn slack_token(&self) -> Result<&str> {
        self.slack_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .with_context(|| format!("{}_SLACK_TOKEN must be set", ENV_PREFIX))
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
