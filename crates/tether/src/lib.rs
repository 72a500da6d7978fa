//! Command bridge between an external caller and a single-instance host
//! application.
//!
//! The host exposes no "ready" callback, so the bridge discovers readiness by
//! polling the host's top-level frames until its main frame appears. Once the
//! frame is captured the bridge announces readiness to the caller and serves
//! resource paths one at a time, answering each with exactly one `loaded` or
//! `error` signal.
//!
//! The moving parts:
//!
//! - [`ReadinessMonitor`] polls a [`FrameRegistry`] on a background thread and
//!   reports a single [`Readiness`] outcome.
//! - [`CommandBridge`] turns that outcome into the readiness signal and runs
//!   the command loop as a [`ReadyBridge`].
//! - [`ControlPlane`] is the caller boundary. [`control_channel`] pairs an
//!   in-process plane with a [`BridgeClient`]; [`LineControlPlane`] speaks one
//!   path per input line and one JSON signal per output line.
//! - [`ResourceLoader`] isolates the host's load capability. Host panics are
//!   caught and reported like any other load failure.
//! - [`bootstrap_with`] loads configuration via [`tether_config`], installs
//!   telemetry, and yields a [`Tether`] whose [`Tether::launch`] runs the
//!   host's entry point beside the bridge. [`run_bridge`] always runs the
//!   host, reporting bootstrap failures to the caller as an `error` signal.
//!
//! A timeout during readiness detection is final: the caller receives
//! `"target not found"` and the loop never starts.

mod bootstrap;
mod bridge;
mod control;
mod errors;
mod frame;
mod health;
mod launch;
mod monitor;
mod target;
mod telemetry;

pub use bootstrap::{
    BootstrapError, BridgeSettings, ConfigLoader, StaticConfigLoader, SystemConfigLoader, Tether,
    bootstrap_with,
};
pub use bridge::{BridgeExit, BridgeState, CommandBridge, CycleOutcome, ReadyBridge};
pub use control::{
    BridgeClient, ChannelControlPlane, ClientError, Command, ControlError, ControlPlane,
    LineControlPlane, MAX_COMMAND_BYTES, Signal, StdioControlPlane, control_channel,
};
pub use errors::{BridgeError, LoadError};
pub use frame::{Frame, FrameHandle, FrameMatcher, FrameRegistry, find_matching};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use launch::{BridgeHandle, BridgeParts, LaunchError, run_bridge, run_bridge_with};
pub use monitor::{Interrupter, MonitorHandle, MonitorSettings, Readiness, ReadinessMonitor, TimeoutCause};
pub use target::{LoadOptions, ResourceLoader};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
