//! Unit tests for config module
//!
//! Tests configuration types, defaults, and serialization.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::panic)]

use crate::config::{Config, ConfigError, ForegroundServiceMode, LogLevel};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.session.foreground_service, ForegroundServiceMode::Lazy);
    assert!(config.artwork.enabled);
    assert_eq!(config.artwork.fetch_timeout_secs, 10);
}

#[test]
fn config_serialize_toml() {
    let toml_str = toml::to_string(&Config::default()).unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[session]"));
    assert!(toml_str.contains("foreground_service = \"lazy\""));
}

#[test]
fn config_deserialize_toml() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [session]
        foreground_service = "always"

        [artwork]
        fetch_timeout_secs = 3
    "#;

    let config = Config::from_toml_str(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.session.foreground_service, ForegroundServiceMode::Always);
    assert_eq!(config.artwork.fetch_timeout_secs, 3);
    assert!(config.artwork.enabled);
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_rejects_unknown_service_mode() {
    let result = Config::from_toml_str("[session]\nforeground_service = \"sometimes\"");

    assert!(matches!(
        result,
        Err(ConfigError::Parse { location, .. }) if location == "string"
    ));
}

#[test]
fn config_schema_lists_sections() {
    let schema = Config::json_schema().to_string();

    assert!(schema.contains("foreground_service"));
    assert!(schema.contains("log_level"));
}
