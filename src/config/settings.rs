//! Application settings loaded from config.toml
//!
//! The file is optional. When present it can set the display currency used for
//! portfolio summaries and list partners to seed into the database on startup.

use crate::core::currency::Currency;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "PAYOUT_LEDGER_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Currency code for portfolio summaries, normalized through the alias table
    #[serde(default = "default_display_currency")]
    pub display_currency: String,
    /// Partners to seed
    #[serde(default)]
    pub partners: Vec<PartnerConfig>,
}

/// A partner to seed on startup
#[derive(Debug, Deserialize, Clone)]
pub struct PartnerConfig {
    /// Stable partner id
    pub id: String,
    /// Display name
    pub name: String,
}

fn default_display_currency() -> String {
    Currency::Dollars.code().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_currency: default_display_currency(),
            partners: Vec::new(),
        }
    }
}

impl Config {
    /// Resolves `display_currency` to a supported currency.
    ///
    /// Unlike display-time conversion this is strict: a typo in the config file
    /// is reported instead of silently falling back.
    pub fn display_currency(&self) -> Result<Currency> {
        self.display_currency.parse()
    }
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Loads configuration from `$PAYOUT_LEDGER_CONFIG` or `./config.toml`.
///
/// A missing file yields [`Config::default`]; a file that exists but does not
/// parse is an error.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        tracing::info!(%path, "No config file found, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}
