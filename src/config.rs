//! Modem connection settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Connection settings for the modem, read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address of the modem's web interface, e.g. "10.1.1.1"
    pub address: String,
    pub username: String,
    pub password: String,
}

impl Config {
    /// Loads configuration from a TOML file at the given path.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }
}
