use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// When the platform media service is kept running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ForegroundServiceMode {
    /// Only while playback is playing or paused.
    #[default]
    Lazy,

    /// For the whole lifetime of the host application.
    Always,
}

/// Media session settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Service lifetime policy.
    pub foreground_service: ForegroundServiceMode,
}

/// Artwork resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Whether artwork references are resolved at all.
    pub enabled: bool,

    /// Timeout for fetching remote artwork, in seconds.
    pub fetch_timeout_secs: u64,

    /// Largest accepted image, in bytes.
    pub max_bytes: usize,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fetch_timeout_secs: 10,
            max_bytes: 8 * 1024 * 1024,
        }
    }
}
