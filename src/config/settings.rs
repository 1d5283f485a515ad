//! Application settings loading from billing.toml.
//!
//! The daemon reads its scheduler cadence from a small TOML file next to
//! the binary. A missing file means defaults; a malformed file is a hard
//! configuration error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_SCAN_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Settings structure representing the billing.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Seconds between scheduler ticks (nominal: one day)
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
        }
    }
}

fn default_scan_interval_secs() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

/// Loads settings from a TOML file. A missing file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse billing.toml: {e}"),
    })
}

/// Loads settings from the default location (./billing.toml).
pub fn load_default_config() -> Result<Settings> {
    load_config("billing.toml")
}
