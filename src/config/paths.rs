use std::{env, path::PathBuf};

use super::ConfigError;

/// Utility struct for locating configuration and log paths
///
/// Follows the XDG Base Directory specification
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the configuration directory path for the application
    ///
    /// - First checks `XDG_CONFIG_HOME`
    /// - Falls back to `$HOME/.config`
    /// - Appends "mediasession" to the base config directory
    ///
    /// # Errors
    /// Returns `ConfigError::MissingHomeDirectory` if neither variable is set
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let config_home = env::var("XDG_CONFIG_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.config")))
            .map_err(|_| ConfigError::MissingHomeDirectory)?;

        Ok(PathBuf::from(config_home).join("mediasession"))
    }

    /// Returns the path to the main configuration file
    ///
    /// # Errors
    /// Returns `ConfigError::MissingHomeDirectory` if the config directory is unknown
    pub fn main_config() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the log directory, `XDG_STATE_HOME` or `$HOME/.local/state`
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if no home directory is known or the directory cannot be created
    pub fn log_dir() -> Result<PathBuf, ConfigError> {
        let state_home = env::var("XDG_STATE_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.local/state")))
            .map_err(|_| ConfigError::MissingHomeDirectory)?;
        let log_dir = PathBuf::from(state_home).join("mediasession").join("logs");

        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir).map_err(|source| ConfigError::Io {
                path: log_dir.clone(),
                source,
            })?;
        }

        Ok(log_dir)
    }
}
