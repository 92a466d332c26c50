use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur while locating or loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O operation error with file context
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    Parse {
        /// File path, or "string" for in-memory input
        location: String,
        /// Parse error details
        details: String,
    },

    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set
    #[error("neither XDG_CONFIG_HOME nor HOME environment variable found")]
    MissingHomeDirectory,
}
