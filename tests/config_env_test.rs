//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Config::from_env() also loads a .env file
//! via dotenvy if one exists, so each test sets the variables it asserts on.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use assessment_client::config::{Config, LogFormat, DEFAULT_API_URL};
use assessment_client::error::AppError;
use serial_test::serial;
use std::env;
use std::time::Duration;

const KEYS: &[&str] = &[
    "ASSESSMENT_API_URL",
    "ASSESSMENT_API_TOKEN",
    "POLL_INTERVAL_MS",
    "REPORT_POLL_INTERVAL_MS",
    "REQUEST_TIMEOUT_MS",
    "LOG_FORMAT",
];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.api.base_url, DEFAULT_API_URL);
    assert!(config.api.token.is_none());
    assert_eq!(config.polling.followup_interval(), Duration::from_millis(10_000));
    assert_eq!(config.polling.report_interval(), Duration::from_millis(15_000));
    assert!(config.request.timeout_ms.is_none());
}

#[test]
#[serial]
fn test_config_from_env_custom_api() {
    clear_env();
    env::set_var("ASSESSMENT_API_URL", "https://assess.example.com");
    env::set_var("ASSESSMENT_API_TOKEN", "pre-issued");

    let config = Config::from_env().unwrap();
    assert_eq!(config.api.base_url, "https://assess.example.com");
    assert_eq!(config.api.token.as_deref(), Some("pre-issued"));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_blank_token_ignored() {
    clear_env();
    env::set_var("ASSESSMENT_API_TOKEN", "  ");

    let config = Config::from_env().unwrap();
    assert!(config.api.token.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_rejects_non_http_url() {
    clear_env();
    env::set_var("ASSESSMENT_API_URL", "ftp://assess.example.com");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_poll_intervals() {
    clear_env();
    env::set_var("POLL_INTERVAL_MS", "2500");
    env::set_var("REPORT_POLL_INTERVAL_MS", "4000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.polling.followup_interval(), Duration::from_millis(2500));
    assert_eq!(config.polling.report_interval(), Duration::from_millis(4000));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_rejects_zero_interval() {
    clear_env();
    env::set_var("POLL_INTERVAL_MS", "0");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("POLL_INTERVAL_MS"));

    env::set_var("POLL_INTERVAL_MS", "soon");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_request_timeout() {
    clear_env();
    env::set_var("REQUEST_TIMEOUT_MS", "60000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, Some(60000));

    env::set_var("REQUEST_TIMEOUT_MS", "0");
    let config = Config::from_env().unwrap();
    assert!(config.request.timeout_ms.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    clear_env();
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "anything-else");
    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);

    clear_env();
}
