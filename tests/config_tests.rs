//! Wait settings loading from layered configuration sources.

use std::time::Duration;

use settle::test_support::{EnvGuard, SimulatedCloud};
use settle::wait::{DEFAULT_MAX_FETCH_RETRIES, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use settle::{HarnessError, LiveHarness, WaitConfigError, WaitSettings};

#[tokio::test]
async fn settings_default_to_documented_constants() {
    let _guard = EnvGuard::set_vars(&[]).await;

    let settings = WaitSettings::load_without_cli_args()
        .unwrap_or_else(|err| panic!("settings should load with defaults: {err}"));
    let config = settings
        .to_wait_config()
        .unwrap_or_else(|err| panic!("default settings should validate: {err}"));

    assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
    assert_eq!(config.max_fetch_retries(), DEFAULT_MAX_FETCH_RETRIES);
}

#[tokio::test]
async fn environment_overrides_defaults() {
    let _guard = EnvGuard::set_vars(&[
        ("SETTLE_TIMEOUT_MS", "1500"),
        ("SETTLE_POLL_INTERVAL_MS", "250"),
        ("SETTLE_MAX_FETCH_RETRIES", "1"),
    ])
    .await;

    let settings = WaitSettings::load_without_cli_args()
        .unwrap_or_else(|err| panic!("settings should load from env: {err}"));

    assert_eq!(
        settings,
        WaitSettings {
            timeout_ms: 1_500,
            poll_interval_ms: 250,
            max_fetch_retries: 1,
        }
    );
    let config = settings
        .to_wait_config()
        .unwrap_or_else(|err| panic!("env settings should validate: {err}"));
    assert_eq!(config.timeout(), Duration::from_millis(1_500));
    assert_eq!(config.poll_interval(), Duration::from_millis(250));
}

#[tokio::test]
async fn zero_poll_interval_is_rejected_with_actionable_error() {
    let _guard = EnvGuard::set_vars(&[("SETTLE_POLL_INTERVAL_MS", "0")]).await;

    let settings = WaitSettings::load_without_cli_args()
        .unwrap_or_else(|err| panic!("settings should load from env: {err}"));
    let err = LiveHarness::from_settings(SimulatedCloud::new(), &settings)
        .expect_err("zero poll interval must be rejected");

    assert_eq!(err, HarnessError::Config(WaitConfigError::ZeroPollInterval));
    let message = err.to_string();
    assert!(
        message.contains("SETTLE_POLL_INTERVAL_MS"),
        "error should mention env var: {message}"
    );
    assert!(
        message.contains("settle.toml"),
        "error should mention config file: {message}"
    );
}
