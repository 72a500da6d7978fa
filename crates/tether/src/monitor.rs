//! Readiness detection by bounded polling.
//!
//! The monitor runs on its own thread, sleeping a fixed interval before each
//! scan of the target's frame registry. It reports exactly one [`Readiness`]
//! outcome through a one-shot channel, which is also the ownership handoff of
//! the captured [`FrameHandle`] to whoever waits on the [`MonitorHandle`].

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use tracing::debug;

use tether_config::{Config, default_max_attempts, default_poll_interval};

use crate::frame::{FrameHandle, FrameMatcher, FrameRegistry, find_matching};
use crate::health::HealthReporter;

pub(crate) const MONITOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::monitor");

/// Polling budget for readiness detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Maximum number of polls before reporting a timeout.
    pub max_attempts: u32,
    /// Sleep preceding every poll.
    pub poll_interval: Duration,
}

impl MonitorSettings {
    /// Builds settings from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Upper bound on the time spent polling.
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_attempts)
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// Why the monitor stopped without finding the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
    /// Every attempt ran without a matching frame.
    Exhausted {
        /// Number of polls performed.
        attempts: u32,
    },
    /// An interrupt arrived while sleeping before the given attempt.
    Interrupted {
        /// Attempt that was about to run.
        attempt: u32,
    },
    /// The monitor thread ended without reporting an outcome.
    Abandoned,
}

impl fmt::Display for TimeoutCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts } => write!(f, "no matching frame after {attempts} attempts"),
            Self::Interrupted { attempt } => write!(f, "interrupted before attempt {attempt}"),
            Self::Abandoned => f.write_str("monitor stopped without reporting"),
        }
    }
}

/// The single outcome of readiness detection.
#[derive(Debug)]
pub enum Readiness<F> {
    /// The target's main frame was captured.
    Found {
        /// Handle to the captured frame.
        frame: FrameHandle<F>,
        /// One-based attempt on which the frame matched.
        attempt: u32,
    },
    /// The target never became available.
    Timeout(TimeoutCause),
}

/// Polls a [`FrameRegistry`] until the target's main frame appears.
pub struct ReadinessMonitor<R> {
    registry: R,
    matcher: FrameMatcher,
    settings: MonitorSettings,
    reporter: Arc<dyn HealthReporter>,
}

impl<R: FrameRegistry> ReadinessMonitor<R> {
    /// Creates a monitor over the given registry.
    pub fn new(
        registry: R,
        matcher: FrameMatcher,
        settings: MonitorSettings,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            registry,
            matcher,
            settings,
            reporter,
        }
    }

    /// Starts detection on a dedicated background thread.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the operating system refuses to create the
    /// monitor thread.
    pub fn detect(self) -> std::io::Result<MonitorHandle<R::Frame>> {
        let (outcome_tx, outcome_rx) = bounded(1);
        let (interrupt_tx, interrupt_rx) = bounded(1);
        thread::Builder::new()
            .name("tether-monitor".to_owned())
            .spawn(move || {
                let readiness = self.detect_blocking(&interrupt_rx);
                // The waiter may already be gone; nothing is left to notify.
                drop(outcome_tx.send(readiness));
            })?;
        Ok(MonitorHandle {
            outcome: outcome_rx,
            interrupter: Interrupter { tx: interrupt_tx },
        })
    }

    /// Runs the polling loop on the calling thread.
    ///
    /// Each attempt sleeps for the poll interval and then scans the registry
    /// once. A message on `interrupt` ends the loop during the sleep; a
    /// disconnected `interrupt` leaves the full budget in force.
    pub fn detect_blocking(&self, interrupt: &Receiver<()>) -> Readiness<R::Frame> {
        self.reporter.monitor_started(&self.matcher, &self.settings);
        for attempt in 1..=self.settings.max_attempts {
            match interrupt.recv_timeout(self.settings.poll_interval) {
                Err(RecvTimeoutError::Timeout) => {}
                // Every interrupter is gone, so nothing can cancel this wait.
                Err(RecvTimeoutError::Disconnected) => thread::sleep(self.settings.poll_interval),
                Ok(()) => return self.timed_out(TimeoutCause::Interrupted { attempt }),
            }

            self.reporter.poll_attempt(attempt);
            if let Some(frame) = find_matching(&self.registry, &self.matcher) {
                self.reporter.target_found(frame.type_name(), attempt);
                return Readiness::Found { frame, attempt };
            }
        }
        self.timed_out(TimeoutCause::Exhausted {
            attempts: self.settings.max_attempts,
        })
    }

    fn timed_out(&self, cause: TimeoutCause) -> Readiness<R::Frame> {
        self.reporter.readiness_timeout(&cause);
        Readiness::Timeout(cause)
    }
}

/// Waiting side of a running [`ReadinessMonitor`].
#[derive(Debug)]
pub struct MonitorHandle<F> {
    outcome: Receiver<Readiness<F>>,
    interrupter: Interrupter,
}

impl<F> MonitorHandle<F> {
    /// Returns a handle that can abort the polling loop.
    #[must_use]
    pub fn interrupter(&self) -> Interrupter {
        self.interrupter.clone()
    }

    /// Blocks until the monitor reports its outcome.
    ///
    /// A monitor thread that dies without reporting (for example because the
    /// registry panicked) is reported as [`TimeoutCause::Abandoned`].
    pub fn wait(self) -> Readiness<F> {
        let Self {
            outcome,
            interrupter,
        } = self;
        let readiness = outcome
            .recv()
            .unwrap_or(Readiness::Timeout(TimeoutCause::Abandoned));
        debug!(target: MONITOR_TARGET, "monitor outcome received");
        drop(interrupter);
        readiness
    }
}

/// Aborts a running monitor during its next sleep.
#[derive(Debug, Clone)]
pub struct Interrupter {
    tx: Sender<()>,
}

impl Interrupter {
    /// Requests that the monitor stop polling.
    ///
    /// Interrupting a monitor that already finished, or one with an interrupt
    /// already pending, has no effect.
    pub fn interrupt(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) | Err(TrySendError::Disconnected(())) => {}
        }
    }
}
