mod log_level;

pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General settings, such as logging.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: LogLevel,
}
