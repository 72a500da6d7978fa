//! The command loop.
//!
//! [`CommandBridge`] waits for the readiness outcome and, once the target's
//! frame is captured, becomes a [`ReadyBridge`] that serves one command at a
//! time until the caller closes the control channel. Every command produces
//! exactly one terminal signal and no failure ends the loop.

use std::sync::Arc;

use strum::Display;
use tracing::{debug, warn};

use crate::control::{Command, ControlError, ControlPlane, Signal};
use crate::errors::BridgeError;
use crate::frame::{Frame, FrameHandle};
use crate::health::HealthReporter;
use crate::monitor::{MonitorHandle, Readiness};
use crate::target::{LoadOptions, ResourceLoader, guarded_load};

const BRIDGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bridge");

/// Lifecycle state of a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BridgeState {
    /// Waiting for the monitor's outcome.
    AwaitingReadiness,
    /// Blocked on the next command.
    Ready,
    /// A command is being loaded.
    Dispatching,
    /// A command failed and its error signal is being sent.
    FaultedButContinuing,
}

/// Why a bridge stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeExit {
    /// Readiness timed out; the loop never ran.
    TargetNotFound,
    /// The caller closed the control channel.
    ControlClosed,
}

/// Result of one pass through the command loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The command loaded and `loaded` was signalled.
    Loaded,
    /// The command failed and an error was signalled.
    Failed,
    /// Empty input; nothing was signalled.
    Skipped,
    /// The control plane rejected the input and an error was signalled.
    Rejected,
    /// The caller is gone.
    Closed,
}

/// Bridge waiting for the target to become ready.
pub struct CommandBridge<C, L> {
    control: C,
    loader: L,
    options: LoadOptions,
    reporter: Arc<dyn HealthReporter>,
}

impl<C, L> CommandBridge<C, L>
where
    C: ControlPlane,
{
    /// Creates a bridge over the given control plane and loader.
    pub fn new(control: C, loader: L, reporter: Arc<dyn HealthReporter>) -> Self {
        reporter.state_changed(BridgeState::AwaitingReadiness);
        Self {
            control,
            loader,
            options: LoadOptions::default(),
            reporter,
        }
    }

    /// Overrides the options forwarded with every load.
    #[must_use]
    pub fn with_load_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Consumes the monitor's outcome.
    ///
    /// On success the readiness signal is sent exactly once and the returned
    /// [`ReadyBridge`] owns the captured frame. On timeout the caller receives
    /// `"target not found"` and no loop is started.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ReadinessTimeout`] when the target never
    /// appeared.
    pub fn accept<F>(mut self, readiness: Readiness<F>) -> Result<ReadyBridge<F, C, L>, BridgeError>
    where
        F: Frame,
        L: ResourceLoader<F>,
    {
        match readiness {
            Readiness::Found { frame, attempt } => {
                debug!(
                    target: BRIDGE_TARGET,
                    frame_type = frame.type_name(),
                    attempt,
                    "target ready"
                );
                let mut ready = ReadyBridge {
                    frame,
                    control: self.control,
                    loader: self.loader,
                    options: self.options,
                    reporter: self.reporter,
                    state: BridgeState::AwaitingReadiness,
                };
                ready.transition(BridgeState::Ready);
                ready.signal(&Signal::Ready);
                Ok(ready)
            }
            Readiness::Timeout(cause) => {
                warn!(target: BRIDGE_TARGET, %cause, "abandoning bridge");
                let error = BridgeError::ReadinessTimeout;
                let signal = Signal::error(error.to_string());
                if let Err(emit_error) = self.control.emit(&signal) {
                    self.reporter.signal_failed(&signal, &emit_error);
                }
                Err(error)
            }
        }
    }

    /// Waits on the monitor, then serves commands until the caller leaves.
    pub fn run<F>(self, monitor: MonitorHandle<F>) -> BridgeExit
    where
        F: Frame,
        L: ResourceLoader<F>,
    {
        match self.accept(monitor.wait()) {
            Ok(ready) => ready.run(),
            Err(_) => BridgeExit::TargetNotFound,
        }
    }
}

/// Bridge that owns the captured frame and serves commands.
pub struct ReadyBridge<F, C, L> {
    frame: FrameHandle<F>,
    control: C,
    loader: L,
    options: LoadOptions,
    reporter: Arc<dyn HealthReporter>,
    state: BridgeState,
}

impl<F, C, L> ReadyBridge<F, C, L>
where
    F: Frame,
    C: ControlPlane,
    L: ResourceLoader<F>,
{
    /// The captured frame.
    pub const fn frame(&self) -> &FrameHandle<F> {
        &self.frame
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> BridgeState {
        self.state
    }

    /// Serves commands until the control channel closes.
    pub fn run(mut self) -> BridgeExit {
        loop {
            if self.run_cycle() == CycleOutcome::Closed {
                return BridgeExit::ControlClosed;
            }
        }
    }

    /// Waits for one command and handles it completely.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        match self.control.await_next_command() {
            Ok(Some(command)) => self.dispatch(&command),
            Ok(None) => {
                debug!(target: BRIDGE_TARGET, "ignoring empty command");
                CycleOutcome::Skipped
            }
            Err(error) if error.is_rejection() => {
                self.reporter.control_rejected(&error);
                self.signal(&Signal::error(error.to_string()));
                CycleOutcome::Rejected
            }
            Err(ControlError::Closed) => {
                self.reporter.control_closed();
                CycleOutcome::Closed
            }
            Err(error) => {
                warn!(target: BRIDGE_TARGET, %error, "control channel failed");
                self.reporter.control_closed();
                CycleOutcome::Closed
            }
        }
    }

    fn dispatch(&mut self, command: &Command) -> CycleOutcome {
        self.transition(BridgeState::Dispatching);
        self.reporter.dispatch_started(command);

        match guarded_load(&mut self.loader, &self.frame, command.path(), self.options) {
            Ok(()) => {
                self.reporter.dispatch_succeeded(command);
                self.signal(&Signal::Loaded);
                self.transition(BridgeState::Ready);
                CycleOutcome::Loaded
            }
            Err(source) => {
                let error = BridgeError::dispatch_failure(command.path(), source);
                self.reporter.dispatch_failed(&error);
                self.transition(BridgeState::FaultedButContinuing);
                self.signal(&Signal::error(error.to_string()));
                self.transition(BridgeState::Ready);
                CycleOutcome::Failed
            }
        }
    }

    fn signal(&mut self, signal: &Signal) {
        if let Err(error) = self.control.emit(signal) {
            self.reporter.signal_failed(signal, &error);
        }
    }

    fn transition(&mut self, state: BridgeState) {
        self.state = state;
        self.reporter.state_changed(state);
    }
}
