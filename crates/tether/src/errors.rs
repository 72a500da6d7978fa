//! Error types surfaced by the command bridge.
//!
//! [`BridgeError`] is what the bridge reports to the caller; its display form
//! is the exact message carried by the error signal. [`LoadError`] is the
//! contract the target-side loader returns through.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use thiserror::Error;

type BoxedTargetError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by the bridge to the control plane.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The target's main frame never appeared. Fatal and not retried.
    #[error("target not found")]
    ReadinessTimeout,

    /// A single command failed. The loop keeps serving later commands.
    #[error("Load failed: {source}")]
    DispatchFailure {
        /// Path named by the failed command.
        path: PathBuf,
        /// Reason reported by the loader.
        #[source]
        source: LoadError,
    },
}

impl BridgeError {
    /// Creates a dispatch failure for the given path.
    pub fn dispatch_failure(path: impl Into<PathBuf>, source: LoadError) -> Self {
        Self::DispatchFailure {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` when the bridge keeps running after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::DispatchFailure { .. })
    }

    /// Path of the failed command, if the error came from a dispatch.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ReadinessTimeout => None,
            Self::DispatchFailure { path, .. } => Some(path),
        }
    }
}

/// Reasons the target failed to load a resource.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The target does not expose the load capability.
    #[error("{capability} is unavailable")]
    CapabilityMissing {
        /// Name of the missing capability.
        capability: String,
    },

    /// The target refused the resource.
    #[error("{reason}")]
    Rejected {
        /// Rejection reason reported by the target.
        reason: String,
    },

    /// The target raised an error while loading.
    #[error("{source}")]
    Target {
        /// Underlying target error.
        #[source]
        source: BoxedTargetError,
    },

    /// The target panicked while loading.
    #[error("target panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl LoadError {
    /// Creates a missing capability error.
    pub fn capability_missing(capability: impl Into<String>) -> Self {
        Self::CapabilityMissing {
            capability: capability.into(),
        }
    }

    /// Creates a rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Wraps an error raised by the target.
    pub fn target(source: impl Into<BoxedTargetError>) -> Self {
        Self::Target {
            source: source.into(),
        }
    }

    /// Creates a panic error from the panic message.
    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }
}
