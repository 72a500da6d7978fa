use serde::{Deserialize, Serialize};

/// Outbound notification delivered to the caller.
///
/// Serialised as a single JSON object tagged by `signal`, for example
/// `{"signal":"error","message":"target not found"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    /// The target is ready; sent at most once.
    Ready,
    /// The last command loaded successfully.
    Loaded,
    /// A failure the caller should know about.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl Signal {
    /// Creates an error signal.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns `true` for the signals that end a command cycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Loaded | Self::Error { .. })
    }
}
