//! Test configuration and loaders for the success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use tether_config::Config;

use crate::bootstrap::ConfigLoader;

/// Configuration with a short poll interval so scenarios finish quickly.
#[must_use]
pub fn fast_config(max_attempts: u32) -> Config {
    Config {
        max_attempts: Some(max_attempts),
        poll_interval_ms: Some(5),
        ..Config::default()
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("tether"),
            OsString::from("--max-attempts"),
            OsString::from("not-a-number"),
        ];
        Config::load_from_iter(args)
    }
}
