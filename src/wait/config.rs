//! Timing configuration for the waiter, loaded via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 300_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Default upper bound on how long a wait keeps polling.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

/// Default delay between two fetches of the same target.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

/// Default number of consecutive transient fetch failures tolerated.
pub const DEFAULT_MAX_FETCH_RETRIES: u32 = 3;

/// Validated timing parameters for a single wait.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitConfig {
    timeout: Duration,
    poll_interval: Duration,
    max_fetch_retries: u32,
}

impl WaitConfig {
    /// Builds a configuration with the default transient-retry bound.
    ///
    /// A zero `timeout` is allowed and results in a single fetch. A
    /// `poll_interval` at or above `timeout` is allowed too; the wait then
    /// degenerates to a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`WaitConfigError::ZeroPollInterval`] when `poll_interval`
    /// is zero.
    pub const fn new(
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, WaitConfigError> {
        if poll_interval.is_zero() {
            return Err(WaitConfigError::ZeroPollInterval);
        }
        Ok(Self {
            timeout,
            poll_interval,
            max_fetch_retries: DEFAULT_MAX_FETCH_RETRIES,
        })
    }

    /// Overrides how many consecutive transient fetch failures are tolerated
    /// before the wait gives up with a fetch failure.
    #[must_use]
    pub const fn with_max_fetch_retries(mut self, retries: u32) -> Self {
        self.max_fetch_retries = retries;
        self
    }

    /// Maximum wall-clock duration to keep polling.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delay between polling attempts.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Consecutive transient failures tolerated before giving up.
    #[must_use]
    pub const fn max_fetch_retries(&self) -> u32 {
        self.max_fetch_retries
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_fetch_retries: DEFAULT_MAX_FETCH_RETRIES,
        }
    }
}

/// Wait settings derived from environment variables and configuration
/// files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SETTLE",
    discovery(
        app_name = "settle",
        env_var = "SETTLE_CONFIG_PATH",
        config_file_name = "settle.toml",
        dotfile_name = ".settle.toml",
        project_file_name = "settle.toml"
    )
)]
pub struct WaitSettings {
    /// Maximum time to keep polling, in milliseconds.
    #[ortho_config(default = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
    /// Delay between polling attempts, in milliseconds. Must be non-zero.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    /// Consecutive transient fetch failures tolerated before giving up.
    #[ortho_config(default = DEFAULT_MAX_FETCH_RETRIES)]
    pub max_fetch_retries: u32,
}

impl WaitSettings {
    /// Loads settings from defaults, configuration files, and environment
    /// variables without parsing process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`WaitConfigError::Parse`] when the loader fails to merge
    /// sources.
    pub fn load_without_cli_args() -> Result<Self, WaitConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("settle")])
            .map_err(|err| WaitConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and TOML key that control the offending value.
    ///
    /// # Errors
    ///
    /// Returns [`WaitConfigError::ZeroPollInterval`] when the poll interval
    /// is zero.
    pub const fn validate(&self) -> Result<(), WaitConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(WaitConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Converts the settings into a [`WaitConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`WaitConfigError`] when validation fails.
    pub fn to_wait_config(&self) -> Result<WaitConfig, WaitConfigError> {
        self.validate()?;
        WaitConfig::new(
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
        .map(|config| config.with_max_fetch_retries(self.max_fetch_retries))
    }
}

/// Errors raised while building wait configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitConfigError {
    /// Raised when the poll interval is zero.
    #[error(
        "poll interval must be greater than zero: set SETTLE_POLL_INTERVAL_MS or add poll_interval_ms to settle.toml"
    )]
    ZeroPollInterval,
    /// Surfaces errors from the `ortho-config` loader.
    #[error("wait configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for WaitConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
