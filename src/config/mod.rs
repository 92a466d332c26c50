//! Configuration schema and loading.
//!
//! All configuration is optional; a missing file or missing table yields
//! defaults. Files are TOML.

mod error;
mod general;
mod paths;
mod session;

pub use error::ConfigError;
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
pub use session::{ArtworkConfig, ForegroundServiceMode, SessionConfig};

use std::{fs, io::ErrorKind, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// General application settings.
    pub general: GeneralConfig,

    /// Media session behaviour.
    pub session: SessionConfig,

    /// Artwork resolution.
    pub artwork: ArtworkConfig,
}

impl Config {
    /// Load the main configuration file, or defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the config directory is unknown, or the file
    /// exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(&ConfigPaths::main_config()?)
    }

    /// Load `path`, or defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument]
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, &path.display().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load `path`, which must exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the text is not valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "string")
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }

    fn parse(content: &str, location: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            location: location.to_string(),
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests;
