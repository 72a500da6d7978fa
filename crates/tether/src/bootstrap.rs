//! Bridge bootstrap orchestration.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use tether_config::Config;

use crate::frame::FrameMatcher;
use crate::health::HealthReporter;
use crate::monitor::MonitorSettings;
use crate::target::LoadOptions;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the bridge configuration.
    ///
    /// # Errors
    ///
    /// Returns the layered loader's error when a source cannot be read or
    /// merged.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads the configuration file and `TETHER_*` environment.
///
/// The host application owns the process arguments, so only the program name
/// reaches the command-line layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(vec![OsString::from(env!("CARGO_PKG_NAME"))])
    }
}

/// Loader that returns a configuration resolved elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Settings the launcher hands to the monitor and the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    matcher: FrameMatcher,
    monitor: MonitorSettings,
    load_options: LoadOptions,
}

impl BridgeSettings {
    /// Resolves settings from configuration.
    ///
    /// A configured `frame_type` takes precedence over the host's default.
    #[must_use]
    pub fn from_config(config: &Config, default_frame_type: &str) -> Self {
        let frame_type = config.frame_type().unwrap_or(default_frame_type);
        Self {
            matcher: FrameMatcher::type_name(frame_type),
            monitor: MonitorSettings::from_config(config),
            load_options: LoadOptions::default(),
        }
    }

    /// Matcher identifying the target's main frame.
    #[must_use]
    pub const fn matcher(&self) -> &FrameMatcher {
        &self.matcher
    }

    /// Readiness polling budget.
    #[must_use]
    pub const fn monitor(&self) -> MonitorSettings {
        self.monitor
    }

    /// Options forwarded with every load.
    #[must_use]
    pub const fn load_options(&self) -> LoadOptions {
        self.load_options
    }
}

/// Result of a successful bootstrap invocation.
pub struct Tether {
    config: Config,
    settings: BridgeSettings,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Tether {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the resolved bridge settings.
    #[must_use]
    pub const fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    pub(crate) fn reporter(&self) -> Arc<dyn HealthReporter> {
        Arc::clone(&self.reporter)
    }
}

/// Bootstraps the bridge using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration or telemetry cannot be
/// initialised. The failure is reported to `reporter` before returning.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    default_frame_type: &str,
) -> Result<Tether, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let settings = BridgeSettings::from_config(&config, default_frame_type);
    reporter.bootstrap_succeeded(&settings);

    Ok(Tether {
        config,
        settings,
        telemetry,
        reporter,
    })
}
