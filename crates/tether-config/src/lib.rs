//! Layered configuration for the tether command bridge.
//!
//! Values are merged by [`ortho_config`] from defaults, an optional
//! configuration file (`--config-path` or `TETHER_CONFIG_PATH`), and `TETHER_*`
//! environment variables. The defaults layer seeds every field that has a
//! built-in value, and the accessor methods on [`Config`] resolve the same
//! defaults for values built by hand, such as [`Config::default`].

mod defaults;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, default_log_filter,
    default_log_format, default_max_attempts, default_poll_interval,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TETHER")]
pub struct Config {
    /// `tracing` filter expression applied to bridge telemetry.
    #[ortho_config(default = default_log_filter().to_owned())]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Output format for bridge telemetry.
    #[ortho_config(default = default_log_format())]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
    /// Fully-qualified type name of the frame that marks the target as ready.
    ///
    /// Overrides the identifier supplied by the host application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_type: Option<String>,
    /// Readiness poll budget.
    #[ortho_config(default = DEFAULT_MAX_ATTEMPTS)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Sleep between readiness polls, in milliseconds.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_MS)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl Config {
    /// Log filter expression with the default applied.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Log format with the default applied.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Frame type override, if one was configured.
    ///
    /// Blank values are treated as absent so an empty environment variable
    /// cannot disable readiness detection.
    #[must_use]
    pub fn frame_type(&self) -> Option<&str> {
        self.frame_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Readiness poll budget with the default applied.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    /// Sleep between readiness polls with the default applied.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_ms
            .map_or_else(default_poll_interval, Duration::from_millis)
    }
}
