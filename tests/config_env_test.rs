//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Note that Config::from_env() also loads
//! from .env file via dotenvy, so these tests focus on override behavior.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use mcp_goal_router::config::{Config, LogFormat};
use mcp_goal_router::error::AppError;
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_config_from_env_loads_successfully() {
    // No variable is required
    let result = Config::from_env();
    assert!(result.is_ok(), "Config::from_env() should succeed with defaults");
}

#[test]
#[serial]
fn test_config_from_env_custom_base_url() {
    env::set_var("ASSISTANT_BASE_URL", " https://assistant.internal/ ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.assistant.base_url, "https://assistant.internal");

    env::remove_var("ASSISTANT_BASE_URL");
}

#[test]
#[serial]
fn test_config_empty_base_url_is_rejected() {
    env::set_var("ASSISTANT_BASE_URL", "   ");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    env::remove_var("ASSISTANT_BASE_URL");
}

#[test]
#[serial]
fn test_config_from_env_api_key() {
    env::set_var("ASSISTANT_API_KEY", "secret");
    let config = Config::from_env().unwrap();
    assert_eq!(config.assistant.api_key.as_deref(), Some("secret"));

    env::set_var("ASSISTANT_API_KEY", "");
    let config = Config::from_env().unwrap();
    assert!(config.assistant.api_key.is_none());

    env::remove_var("ASSISTANT_API_KEY");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "pretty");
}

#[test]
#[serial]
fn test_config_from_env_log_level() {
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.level, "debug");

    env::set_var("LOG_LEVEL", "info");
}

#[test]
#[serial]
fn test_config_from_env_custom_timeout() {
    env::set_var("REQUEST_TIMEOUT_MS", "60000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);

    env::set_var("REQUEST_TIMEOUT_MS", "30000");
}

#[test]
#[serial]
fn test_config_invalid_number_uses_default() {
    env::set_var("REQUEST_TIMEOUT_MS", "soon");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 30000);

    env::set_var("REQUEST_TIMEOUT_MS", "30000");
}

#[test]
#[serial]
fn test_config_default_space() {
    env::set_var("DEFAULT_SPACE", "ENG");
    let config = Config::from_env().unwrap();
    assert_eq!(config.run.default_space.as_deref(), Some("ENG"));

    env::remove_var("DEFAULT_SPACE");
    let config = Config::from_env().unwrap();
    assert!(config.run.default_space.is_none());
}
