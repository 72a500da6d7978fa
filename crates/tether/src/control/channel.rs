//! In-process control plane built on a rendezvous channel.
//!
//! Commands travel over a zero-capacity channel, so [`BridgeClient::submit`]
//! returns only once the bridge has taken the command. Signals travel the
//! other way over an unbounded channel and never block the bridge.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use thiserror::Error;

use super::{Command, ControlError, ControlPlane, Signal};

/// Creates a connected control plane and caller-side client.
#[must_use]
pub fn control_channel() -> (ChannelControlPlane, BridgeClient) {
    let (command_tx, command_rx) = bounded(0);
    let (signal_tx, signal_rx) = unbounded();
    (
        ChannelControlPlane {
            commands: command_rx,
            signals: signal_tx,
        },
        BridgeClient {
            commands: command_tx,
            signals: signal_rx,
        },
    )
}

/// Bridge side of [`control_channel`].
#[derive(Debug)]
pub struct ChannelControlPlane {
    commands: Receiver<String>,
    signals: Sender<Signal>,
}

impl ControlPlane for ChannelControlPlane {
    fn emit(&mut self, signal: &Signal) -> Result<(), ControlError> {
        self.signals
            .send(signal.clone())
            .map_err(|_| ControlError::Closed)
    }

    fn await_next_command(&mut self) -> Result<Option<Command>, ControlError> {
        let raw = self.commands.recv().map_err(|_| ControlError::Closed)?;
        Ok(Command::parse(raw))
    }
}

/// Errors observed by the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The bridge is gone.
    #[error("bridge disconnected")]
    Disconnected,

    /// No signal arrived in time.
    #[error("no signal within {timeout_ms} ms")]
    Timeout {
        /// Time waited, in milliseconds.
        timeout_ms: u64,
    },

    /// An empty path would never produce a signal.
    #[error("empty command produces no signal")]
    EmptyCommand,

    /// The bridge reported failure instead of readiness.
    #[error("bridge not ready: {message}")]
    NotReady {
        /// Message carried by the error signal.
        message: String,
    },
}

impl ClientError {
    fn timeout(timeout: Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Caller side of [`control_channel`].
///
/// Dropping the client closes the channel and ends the bridge's loop.
#[derive(Debug)]
pub struct BridgeClient {
    commands: Sender<String>,
    signals: Receiver<Signal>,
}

impl BridgeClient {
    /// Hands a raw path to the bridge, blocking until it is taken.
    ///
    /// An empty path is delivered as-is and the bridge ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Disconnected`] when the bridge has stopped.
    pub fn submit(&self, path: impl Into<String>) -> Result<(), ClientError> {
        self.commands
            .send(path.into())
            .map_err(|_| ClientError::Disconnected)
    }

    /// Blocks until the next signal.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Disconnected`] when the bridge has stopped and no
    /// signals remain.
    pub fn recv_signal(&self) -> Result<Signal, ClientError> {
        self.signals.recv().map_err(|_| ClientError::Disconnected)
    }

    /// Waits up to `timeout` for the next signal.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when nothing arrives in time or
    /// [`ClientError::Disconnected`] when the bridge has stopped.
    pub fn recv_signal_timeout(&self, timeout: Duration) -> Result<Signal, ClientError> {
        self.signals.recv_timeout(timeout).map_err(|error| match error {
            RecvTimeoutError::Timeout => ClientError::timeout(timeout),
            RecvTimeoutError::Disconnected => ClientError::Disconnected,
        })
    }

    /// Waits for the bridge's readiness announcement.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotReady`] when the bridge reports that the
    /// target was not found, plus the errors of
    /// [`BridgeClient::recv_signal_timeout`].
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), ClientError> {
        match self.recv_signal_timeout(timeout)? {
            Signal::Ready => Ok(()),
            Signal::Error { message } => Err(ClientError::NotReady { message }),
            Signal::Loaded => Err(ClientError::NotReady {
                message: "unexpected loaded signal".to_owned(),
            }),
        }
    }

    /// Submits a path and waits for its terminal signal.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyCommand`] for an empty path, plus the errors
    /// of [`BridgeClient::submit`] and [`BridgeClient::recv_signal_timeout`].
    pub fn load(&self, path: &str, timeout: Duration) -> Result<Signal, ClientError> {
        if path.is_empty() {
            return Err(ClientError::EmptyCommand);
        }
        self.submit(path)?;
        self.recv_signal_timeout(timeout)
    }
}
