use std::fmt;

use super::MediaAction;

/// Reconcile stage that pushes to a platform sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStage {
    /// Session playback state
    PlaybackState,

    /// Session metadata
    Metadata,

    /// Notification
    Notification,
}

impl fmt::Display for SinkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaybackState => write!(f, "playback state"),
            Self::Metadata => write!(f, "metadata"),
            Self::Notification => write!(f, "notification"),
        }
    }
}

/// Errors returned by platform sink implementations
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    /// Platform object is not constructed or has been torn down
    #[error("Platform object unavailable: {0}")]
    Unavailable(String),

    /// Platform rejected the update
    #[error("Platform rejected update: {0}")]
    Rejected(String),
}

/// Errors that can occur while driving the media session
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// A sink push failed; the update is not retried
    #[error("Failed to push {stage} to platform sink: {source}")]
    Sink {
        /// Stage whose push failed
        stage: SinkStage,
        /// Error reported by the sink
        #[source]
        source: SinkError,
    },

    /// Action name not known to the catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors building or querying the action catalog
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// Action name is not a known transport action
    #[error("Unknown media action '{0}'")]
    UnknownAction(String),

    /// Same action described twice
    #[error("Action {0} described more than once")]
    DuplicateAction(MediaAction),

    /// Catalog has no entries
    #[error("Action catalog must describe at least one action")]
    Empty,
}

/// Errors resolving an artwork reference to image data
#[derive(thiserror::Error, Debug)]
pub enum ArtworkError {
    /// Reference uses a scheme the resolver cannot fetch
    #[error("Unsupported artwork source '{0}'")]
    UnsupportedScheme(String),

    /// `data:` URI without a base64 payload
    #[error("Malformed data URI: {0}")]
    InvalidDataUri(String),

    /// Base64 payload failed to decode
    #[error("Failed to decode artwork: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Network fetch failed
    #[error("Failed to fetch artwork: {0}")]
    Fetch(String),

    /// Artwork exceeds the configured size cap
    #[error("Artwork too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Received size
        size: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Source resolved to zero bytes
    #[error("Artwork source produced no data")]
    Empty,

    /// Artwork fetching is disabled by configuration
    #[error("Artwork fetching disabled")]
    Disabled,
}
