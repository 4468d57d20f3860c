//! Odometer configuration file handling
//!
//! Settings come from `odometer.toml` (or the file passed with `--config`):
//!
//! ```toml
//! [animation]
//! steps = 15
//! tick_interval_ms = 17
//!
//! [display]
//! separator = ","
//! ```
//!
//! Command-line flags override anything read from the file.

use anyhow::{Context, Result};
use odometer_animation::{format, AnimatorConfig, Formatter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "odometer.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OdometerConfig {
    #[serde(default)]
    pub animation: AnimatorConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// How values are rendered on the terminal
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Thousands separator; plain digits when unset
    #[serde(default)]
    pub separator: Option<String>,
}

impl DisplayConfig {
    pub fn formatter(&self) -> Formatter {
        match &self.separator {
            Some(separator) => format::grouped(separator.as_str()),
            None => format::plain(),
        }
    }
}

impl OdometerConfig {
    /// Load the given file, or `odometer.toml` from the working directory
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
