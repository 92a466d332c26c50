use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logging verbosity used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only failures that leave transport controls unusable.
    Error,

    /// Dropped actions, failed artwork fetches and sink errors.
    Warn,

    /// Service lifecycle changes (default level).
    #[default]
    Info,

    /// Recomputed action sets and discarded artwork.
    Debug,

    /// Every sink push with its payload.
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
