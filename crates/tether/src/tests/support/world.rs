//! BDD test world: a bootstrapped bridge driven through the in-process client.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use tether_config::Config;

use crate::bootstrap::{StaticConfigLoader, bootstrap_with};
use crate::bridge::BridgeExit;
use crate::control::{BridgeClient, ClientError, Signal, control_channel};
use crate::launch::{BridgeHandle, BridgeParts};

use super::config_loader::fast_config;
use super::frames::{MAIN_FRAME, ScriptedRegistry};
use super::loader::RecordingLoader;
use super::reporter::{HealthEvent, RecordingHealthReporter};

const SIGNAL_WAIT: Duration = Duration::from_secs(5);
const QUIET_WAIT: Duration = Duration::from_millis(50);

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    config: Config,
    registry: ScriptedRegistry,
    pub loader: RecordingLoader,
    pub reporter: Arc<RecordingHealthReporter>,
    client: Option<BridgeClient>,
    handle: Option<BridgeHandle>,
    signals: Vec<Signal>,
    last_signal: Option<Result<Signal, ClientError>>,
    exit: Option<BridgeExit>,
}

impl TestWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: fast_config(3),
            registry: ScriptedRegistry::never(),
            loader: RecordingLoader::default(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            client: None,
            handle: None,
            signals: Vec::new(),
            last_signal: None,
            exit: None,
        }
    }

    pub fn use_registry(&mut self, registry: ScriptedRegistry, max_attempts: u32) {
        self.registry = registry;
        self.config = fast_config(max_attempts);
    }

    /// Bootstraps and spawns the bridge with the scenario's collaborators.
    pub fn launch(&mut self) {
        let loader = StaticConfigLoader::new(self.config.clone());
        let tether = bootstrap_with(&loader, self.reporter.clone(), MAIN_FRAME)
            .expect("bootstrap should succeed");
        let (plane, client) = control_channel();
        let parts = BridgeParts::new(self.registry.clone(), plane, self.loader.clone());
        self.handle = Some(tether.spawn(parts).expect("bridge should start"));
        self.client = Some(client);
    }

    pub fn interrupt(&self) {
        self.handle
            .as_ref()
            .expect("bridge not launched")
            .interrupter()
            .interrupt();
    }

    fn client(&self) -> &BridgeClient {
        self.client.as_ref().expect("bridge not launched")
    }

    /// Waits for the next signal and keeps it for later assertions.
    pub fn receive(&mut self) -> Result<Signal, ClientError> {
        let received = self.client().recv_signal_timeout(SIGNAL_WAIT);
        if let Ok(signal) = &received {
            self.signals.push(signal.clone());
        }
        received
    }

    pub fn submit(&mut self, path: &str) {
        self.client()
            .submit(path)
            .expect("bridge should accept command");
    }

    pub fn load(&mut self, path: &str) {
        self.submit(path);
        self.last_signal = Some(self.receive());
    }

    #[must_use]
    pub fn last_signal(&self) -> Option<&Result<Signal, ClientError>> {
        self.last_signal.as_ref()
    }

    /// Drops the client, which closes the control channel.
    pub fn close_channel(&mut self) {
        self.client = None;
    }

    /// Joins the bridge thread once and caches its exit.
    pub fn exit(&mut self) -> BridgeExit {
        if let Some(handle) = self.handle.take() {
            self.exit = Some(handle.join().expect("bridge thread should not panic"));
        }
        self.exit.expect("bridge not launched")
    }

    /// Asserts that no further signal arrives shortly.
    pub fn assert_quiet(&self) {
        if let Some(client) = &self.client {
            let pending = client.recv_signal_timeout(QUIET_WAIT);
            assert!(
                matches!(
                    pending,
                    Err(ClientError::Timeout { .. } | ClientError::Disconnected)
                ),
                "unexpected signal: {pending:?}"
            );
        }
    }

    #[must_use]
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    #[must_use]
    pub fn found_on(&self) -> Option<u32> {
        self.reporter.events().into_iter().find_map(|event| match event {
            HealthEvent::TargetFound { attempt, .. } => Some(attempt),
            _ => None,
        })
    }
}

impl Drop for TestWorld {
    fn drop(&mut self) {
        self.client = None;
        if let Some(handle) = self.handle.take() {
            handle.interrupter().interrupt();
            drop(handle.join());
        }
    }
}

/// Builds a fresh scenario world.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
