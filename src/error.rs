use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::{ArtworkError, SessionError};

/// Top-level error for the `mediasession` crate.
///
/// Wraps the error of each subsystem so callers that drive the whole stack
/// (the command-line tool, embedding shells) can use a single `Result`.
#[derive(Error, Debug)]
pub enum MediaSessionError {
    /// Configuration could not be located or loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session reconciliation or bridge input failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Artwork resolver could not be constructed
    #[error(transparent)]
    Artwork(#[from] ArtworkError),

    /// Replay scenario could not be read or parsed
    #[error("invalid scenario '{path}': {details}")]
    Scenario {
        /// Scenario file
        path: PathBuf,
        /// What went wrong
        details: String,
    },
}

/// A specialized `Result` type for crate-level operations.
pub type Result<T> = std::result::Result<T, MediaSessionError>;
