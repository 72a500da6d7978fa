//! Telemetry for a bridge that lives inside the host's process.
//!
//! The host application may already own the global `tracing` dispatcher. In
//! that case the bridge leaves it alone and its events flow to the host's
//! subscriber. Otherwise the bridge installs its own subscriber on stderr;
//! stdout is reserved for the line control plane.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, debug};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use tether_config::{Config, LogFormat};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

static TELEMETRY: OnceCell<TelemetryHandle> = OnceCell::new();

/// Records which subscriber receives bridge events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    installed: bool,
}

impl TelemetryHandle {
    /// `true` when the bridge installed the global subscriber, `false` when
    /// the host's subscriber was already in place.
    #[must_use]
    pub const fn installed(self) -> bool {
        self.installed
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
}

/// Resolves bridge telemetry once per process.
///
/// Later calls return the handle from the first successful call.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the bridge would install its own
/// subscriber and the configured filter does not parse.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| install_subscriber(config))
        .copied()
}

fn install_subscriber(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(host_subscriber());
    }

    let filter = log_filter(config)?;
    let subscriber = bridge_subscriber(filter, config.log_format());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // The host won the race between the check and the install.
        return Ok(host_subscriber());
    }
    Ok(TelemetryHandle { installed: true })
}

fn host_subscriber() -> TelemetryHandle {
    debug!(
        target: TELEMETRY_TARGET,
        "global subscriber already installed; bridge events follow the host"
    );
    TelemetryHandle { installed: false }
}

fn log_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn bridge_subscriber(filter: EnvFilter, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn existing_host_subscriber_is_kept() {
        // Either this call installs the host stand-in or an earlier test
        // already set a global dispatcher; both leave one in place.
        drop(tracing::subscriber::set_global_default(
            tracing::subscriber::NoSubscriber::default(),
        ));

        let first = initialise(&Config::default()).expect("telemetry should resolve");
        let second = initialise(&Config::default()).expect("telemetry should resolve");

        assert_eq!(first, second);
    }

    #[rstest]
    fn invalid_filter_is_rejected() {
        let config = Config {
            log_filter: Some("tether=loudest".to_owned()),
            ..Config::default()
        };

        let error = log_filter(&config).expect_err("filter should not parse");

        assert!(matches!(error, TelemetryError::Filter(_)));
    }
}
