//! Handles settings for the application.
//!
//! Values are read from `config/settleup.toml` (or the file passed with
//! `--config`), then from `SETTLEUP_*` environment variables, e.g.
//! `SETTLEUP_LEDGER__PATH=/tmp/ledger.json`.
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config/settleup.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// `tracing` level applied to this binary and the engine.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ledger {
    /// JSON snapshot holding users, bills and splits.
    pub path: String,
    /// Pretty-print the snapshot when writing it back.
    pub pretty: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            path: "ledger.json".to_string(),
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub ledger: Ledger,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = Config::builder()
            .add_source(File::with_name(path).required(config_path.is_some()))
            .add_source(Environment::with_prefix("SETTLEUP").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
