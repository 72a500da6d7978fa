//! Boundary between the bridge and the external caller.
//!
//! The caller sees three outbound signals and feeds the bridge one path at a
//! time. [`ControlPlane`] captures that contract; [`control_channel`] and
//! [`LineControlPlane`] are the two transports shipped with the crate.

mod channel;
mod line;
mod signal;

use std::io;
use std::path::Path;
use std::string::FromUtf8Error;

use thiserror::Error;

pub use channel::{BridgeClient, ChannelControlPlane, ClientError, control_channel};
pub use line::{LineControlPlane, MAX_COMMAND_BYTES, StdioControlPlane};
pub use signal::Signal;

/// Errors surfaced by a control plane.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The caller closed the channel.
    #[error("control channel closed")]
    Closed,

    /// IO error while reading a command or writing a signal.
    #[error("control IO error: {0}")]
    Io(#[from] io::Error),

    /// The incoming line exceeded the size limit.
    #[error("command too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Bytes received for the line.
        size: usize,
        /// Maximum accepted line length.
        max_size: usize,
    },

    /// The incoming line was not valid UTF-8.
    #[error("command is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A signal could not be serialised.
    #[error("failed to serialise signal: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ControlError {
    /// Returns `true` for input the caller should be told about without ending
    /// the session.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::RequestTooLarge { .. } | Self::InvalidUtf8(_))
    }
}

/// A single resource path issued by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    /// Wraps raw caller input. The empty string is not a command.
    #[must_use]
    pub fn parse(raw: String) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The path exactly as the caller sent it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path to load.
    #[must_use]
    pub fn path(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// Outbound signals and inbound commands exchanged with the caller.
pub trait ControlPlane: Send {
    /// Delivers one signal to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error when the caller is gone or the transport fails.
    fn emit(&mut self, signal: &Signal) -> Result<(), ControlError>;

    /// Blocks until the caller supplies the next path.
    ///
    /// Returns `Ok(None)` for empty input, which is not a command.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Closed`] once the caller has closed the channel,
    /// or a rejection for input that could not be turned into a command.
    fn await_next_command(&mut self) -> Result<Option<Command>, ControlError>;

    /// Announces that the target is ready to accept commands.
    ///
    /// # Errors
    ///
    /// See [`ControlPlane::emit`].
    fn signal_ready(&mut self) -> Result<(), ControlError> {
        self.emit(&Signal::Ready)
    }

    /// Announces that the last command succeeded.
    ///
    /// # Errors
    ///
    /// See [`ControlPlane::emit`].
    fn signal_loaded(&mut self) -> Result<(), ControlError> {
        self.emit(&Signal::Loaded)
    }

    /// Reports a failure to the caller.
    ///
    /// # Errors
    ///
    /// See [`ControlPlane::emit`].
    fn signal_error(&mut self, message: &str) -> Result<(), ControlError> {
        self.emit(&Signal::error(message))
    }
}
