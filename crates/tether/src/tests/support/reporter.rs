//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use crate::bootstrap::{BootstrapError, BridgeSettings};
use crate::bridge::BridgeState;
use crate::control::{Command, ControlError, Signal};
use crate::errors::BridgeError;
use crate::frame::FrameMatcher;
use crate::health::HealthReporter;
use crate::launch::LaunchError;
use crate::monitor::{MonitorSettings, TimeoutCause};

/// Structured health events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded { frame_type: String },
    BootstrapFailed(String),
    LaunchFailed(String),
    MonitorStarted { frame_type: String, max_attempts: u32 },
    PollAttempt(u32),
    TargetFound { frame_type: String, attempt: u32 },
    ReadinessTimeout(TimeoutCause),
    StateChanged(BridgeState),
    DispatchStarted(String),
    DispatchSucceeded(String),
    DispatchFailed(String),
    ControlRejected(String),
    SignalFailed(Signal),
    ControlClosed,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// State transitions in the order they were reported.
    #[must_use]
    pub fn states(&self) -> Vec<BridgeState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, settings: &BridgeSettings) {
        self.record(HealthEvent::BootstrapSucceeded {
            frame_type: settings.matcher().identifier().to_owned(),
        });
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn launch_failed(&self, error: &LaunchError) {
        self.record(HealthEvent::LaunchFailed(error.to_string()));
    }

    fn monitor_started(&self, matcher: &FrameMatcher, settings: &MonitorSettings) {
        self.record(HealthEvent::MonitorStarted {
            frame_type: matcher.identifier().to_owned(),
            max_attempts: settings.max_attempts,
        });
    }

    fn poll_attempt(&self, attempt: u32) {
        self.record(HealthEvent::PollAttempt(attempt));
    }

    fn target_found(&self, type_name: &str, attempt: u32) {
        self.record(HealthEvent::TargetFound {
            frame_type: type_name.to_owned(),
            attempt,
        });
    }

    fn readiness_timeout(&self, cause: &TimeoutCause) {
        self.record(HealthEvent::ReadinessTimeout(*cause));
    }

    fn state_changed(&self, state: BridgeState) {
        self.record(HealthEvent::StateChanged(state));
    }

    fn dispatch_started(&self, command: &Command) {
        self.record(HealthEvent::DispatchStarted(command.as_str().to_owned()));
    }

    fn dispatch_succeeded(&self, command: &Command) {
        self.record(HealthEvent::DispatchSucceeded(command.as_str().to_owned()));
    }

    fn dispatch_failed(&self, error: &BridgeError) {
        self.record(HealthEvent::DispatchFailed(error.to_string()));
    }

    fn control_rejected(&self, error: &ControlError) {
        self.record(HealthEvent::ControlRejected(error.to_string()));
    }

    fn signal_failed(&self, signal: &Signal, _error: &ControlError) {
        self.record(HealthEvent::SignalFailed(signal.clone()));
    }

    fn control_closed(&self) {
        self.record(HealthEvent::ControlClosed);
    }
}
