//! Optional configuration file
//!
//! `<config home>/apura/config.toml` can hold a default ledger path so
//! `--ledger` does not need repeating on every invocation. A missing file
//! is simply an empty config; only a malformed one is an error.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Contents of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Ledger file used when neither --ledger nor APURA_LEDGER is given
    pub ledger: Option<PathBuf>,
}

/// Platform-specific config file location, if a config home exists.
pub fn config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("apura").join("config.toml"))
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
}
