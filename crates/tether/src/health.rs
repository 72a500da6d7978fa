//! Structured health reporting for bridge lifecycle events.

use std::sync::Arc;

use crate::bootstrap::{BootstrapError, BridgeSettings};
use crate::bridge::BridgeState;
use crate::control::{Command, ControlError, Signal};
use crate::errors::BridgeError;
use crate::frame::FrameMatcher;
use crate::launch::LaunchError;
use crate::monitor::{MonitorSettings, TimeoutCause};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, settings: &BridgeSettings);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the bridge threads cannot be started; the host still runs.
    fn launch_failed(&self, error: &LaunchError);

    /// Invoked when readiness polling begins.
    fn monitor_started(&self, matcher: &FrameMatcher, settings: &MonitorSettings);

    /// Invoked before each scan of the frame registry.
    fn poll_attempt(&self, attempt: u32);

    /// Invoked when the target's main frame is captured.
    fn target_found(&self, type_name: &str, attempt: u32);

    /// Invoked when readiness detection gives up.
    fn readiness_timeout(&self, cause: &TimeoutCause);

    /// Invoked on every bridge state transition.
    fn state_changed(&self, state: BridgeState);

    /// Invoked before a command is handed to the loader.
    fn dispatch_started(&self, command: &Command);

    /// Invoked after the loader accepts a command.
    fn dispatch_succeeded(&self, command: &Command);

    /// Invoked when a command fails; the loop continues.
    fn dispatch_failed(&self, error: &BridgeError);

    /// Invoked when the control plane rejects input before it becomes a command.
    fn control_rejected(&self, error: &ControlError);

    /// Invoked when a signal cannot be delivered to the caller.
    fn signal_failed(&self, signal: &Signal, error: &ControlError);

    /// Invoked when the caller closes the control channel.
    fn control_closed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, settings: &BridgeSettings) {
        (**self).bootstrap_succeeded(settings);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn launch_failed(&self, error: &LaunchError) {
        (**self).launch_failed(error);
    }

    fn monitor_started(&self, matcher: &FrameMatcher, settings: &MonitorSettings) {
        (**self).monitor_started(matcher, settings);
    }

    fn poll_attempt(&self, attempt: u32) {
        (**self).poll_attempt(attempt);
    }

    fn target_found(&self, type_name: &str, attempt: u32) {
        (**self).target_found(type_name, attempt);
    }

    fn readiness_timeout(&self, cause: &TimeoutCause) {
        (**self).readiness_timeout(cause);
    }

    fn state_changed(&self, state: BridgeState) {
        (**self).state_changed(state);
    }

    fn dispatch_started(&self, command: &Command) {
        (**self).dispatch_started(command);
    }

    fn dispatch_succeeded(&self, command: &Command) {
        (**self).dispatch_succeeded(command);
    }

    fn dispatch_failed(&self, error: &BridgeError) {
        (**self).dispatch_failed(error);
    }

    fn control_rejected(&self, error: &ControlError) {
        (**self).control_rejected(error);
    }

    fn signal_failed(&self, signal: &Signal, error: &ControlError) {
        (**self).signal_failed(signal, error);
    }

    fn control_closed(&self) {
        (**self).control_closed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting bridge bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, settings: &BridgeSettings) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            frame_type = %settings.matcher(),
            max_attempts = settings.monitor().max_attempts,
            poll_interval = ?settings.monitor().poll_interval,
            "bridge bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "bridge bootstrap failed"
        );
    }

    fn launch_failed(&self, error: &LaunchError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "launch_failed",
            error = %error,
            "bridge could not start; host continues without it"
        );
    }

    fn monitor_started(&self, matcher: &FrameMatcher, settings: &MonitorSettings) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "monitor_started",
            frame_type = %matcher,
            max_attempts = settings.max_attempts,
            budget = ?settings.budget(),
            "waiting for target frame"
        );
    }

    fn poll_attempt(&self, attempt: u32) {
        tracing::trace!(
            target: HEALTH_TARGET,
            event = "poll_attempt",
            attempt,
            "scanning top-level frames"
        );
    }

    fn target_found(&self, type_name: &str, attempt: u32) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "target_found",
            frame_type = type_name,
            attempt,
            "target frame captured"
        );
    }

    fn readiness_timeout(&self, cause: &TimeoutCause) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "readiness_timeout",
            cause = %cause,
            "target frame never appeared"
        );
    }

    fn state_changed(&self, state: BridgeState) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "state_changed",
            state = %state,
            "bridge state changed"
        );
    }

    fn dispatch_started(&self, command: &Command) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "dispatch_started",
            path = %command.as_str(),
            "dispatching command"
        );
    }

    fn dispatch_succeeded(&self, command: &Command) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "dispatch_succeeded",
            path = %command.as_str(),
            "resource loaded"
        );
    }

    fn dispatch_failed(&self, error: &BridgeError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "dispatch_failed",
            error = %error,
            detail = ?error,
            "command failed"
        );
    }

    fn control_rejected(&self, error: &ControlError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "control_rejected",
            error = %error,
            "control input rejected"
        );
    }

    fn signal_failed(&self, signal: &Signal, error: &ControlError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "signal_failed",
            signal = ?signal,
            error = %error,
            "failed to deliver signal"
        );
    }

    fn control_closed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "control_closed",
            "control channel closed by caller"
        );
    }
}
