//! Wiring the monitor and the bridge around the host application.
//!
//! The host's entry point keeps the calling thread. Readiness detection and
//! the command loop run beside it on background threads, so the bridge never
//! sits on the host's startup path.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{info, warn};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, Tether, bootstrap_with};
use crate::bridge::{BridgeExit, CommandBridge};
use crate::control::ControlPlane;
use crate::frame::FrameRegistry;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::monitor::{Interrupter, ReadinessMonitor};
use crate::target::ResourceLoader;

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Errors surfaced while starting or joining the bridge.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// A background thread could not be created.
    #[error("failed to spawn {thread} thread: {source}")]
    SpawnThread {
        /// Name of the thread that failed to start.
        thread: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The bridge thread panicked.
    #[error("bridge thread panicked")]
    ThreadPanic,
}

/// Collaborators supplied by the host application.
#[derive(Debug)]
pub struct BridgeParts<R, C, L> {
    /// Live registry of the target's top-level frames.
    pub registry: R,
    /// Channel to the external caller.
    pub control: C,
    /// Adapter around the target's load capability.
    pub loader: L,
}

impl<R, C, L> BridgeParts<R, C, L> {
    /// Bundles the host collaborators.
    pub const fn new(registry: R, control: C, loader: L) -> Self {
        Self {
            registry,
            control,
            loader,
        }
    }
}

/// Running bridge.
#[derive(Debug)]
pub struct BridgeHandle {
    interrupter: Interrupter,
    thread: JoinHandle<BridgeExit>,
}

impl BridgeHandle {
    /// Returns a handle that aborts readiness detection.
    ///
    /// Interrupting makes the bridge report `"target not found"`. It has no
    /// effect once the target was found.
    #[must_use]
    pub fn interrupter(&self) -> Interrupter {
        self.interrupter.clone()
    }

    /// Waits for the bridge thread to finish.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ThreadPanic`] if the bridge thread panicked.
    pub fn join(self) -> Result<BridgeExit, LaunchError> {
        self.thread.join().map_err(|_| LaunchError::ThreadPanic)
    }
}

impl Tether {
    /// Starts readiness detection and the command loop in the background.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::SpawnThread`] if either background thread cannot
    /// be created.
    pub fn spawn<R, C, L>(&self, parts: BridgeParts<R, C, L>) -> Result<BridgeHandle, LaunchError>
    where
        R: FrameRegistry,
        C: ControlPlane + 'static,
        L: ResourceLoader<R::Frame> + 'static,
    {
        let settings = self.settings();
        let reporter: Arc<dyn HealthReporter> = self.reporter();
        let BridgeParts {
            registry,
            control,
            loader,
        } = parts;

        let monitor = ReadinessMonitor::new(
            registry,
            settings.matcher().clone(),
            settings.monitor(),
            Arc::clone(&reporter),
        )
        .detect()
        .map_err(|source| LaunchError::SpawnThread {
            thread: "monitor",
            source,
        })?;
        let interrupter = monitor.interrupter();

        let bridge = CommandBridge::new(control, loader, reporter)
            .with_load_options(settings.load_options());
        let thread = thread::Builder::new()
            .name("tether-bridge".to_owned())
            .spawn(move || {
                let exit = bridge.run(monitor);
                info!(target: LAUNCH_TARGET, ?exit, "bridge stopped");
                exit
            })
            .map_err(|source| {
                interrupter.interrupt();
                LaunchError::SpawnThread {
                    thread: "bridge",
                    source,
                }
            })?;

        info!(
            target: LAUNCH_TARGET,
            frame_type = %settings.matcher(),
            "bridge started"
        );
        Ok(BridgeHandle {
            interrupter,
            thread,
        })
    }

    /// Starts the bridge, then runs the host's entry point on this thread.
    ///
    /// The bridge keeps running detached after `app_main` returns; its
    /// lifetime is bounded by the process.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::SpawnThread`] without running `app_main` when
    /// the bridge cannot be started.
    pub fn launch<R, C, L, T>(
        &self,
        parts: BridgeParts<R, C, L>,
        app_main: impl FnOnce() -> T,
    ) -> Result<T, LaunchError>
    where
        R: FrameRegistry,
        C: ControlPlane + 'static,
        L: ResourceLoader<R::Frame> + 'static,
    {
        let handle = self.spawn(parts)?;
        let output = app_main();
        drop(handle);
        Ok(output)
    }
}

/// Bootstraps with the production collaborators and runs the host.
///
/// `default_frame_type` names the host's main frame type; the `frame_type`
/// configuration key overrides it. See [`run_bridge_with`] for how failures
/// are handled.
pub fn run_bridge<R, C, L, T>(
    default_frame_type: &str,
    parts: BridgeParts<R, C, L>,
    app_main: impl FnOnce() -> T,
) -> T
where
    R: FrameRegistry,
    C: ControlPlane + 'static,
    L: ResourceLoader<R::Frame> + 'static,
{
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    run_bridge_with(&SystemConfigLoader, reporter, default_frame_type, parts, app_main)
}

/// Starts the bridge beside the host, then runs `app_main` on this thread.
///
/// The host always runs. When bootstrap fails the caller receives a single
/// `error` signal carrying the bootstrap error and no command is ever
/// served. When a bridge thread cannot be created the failure goes to
/// [`HealthReporter::launch_failed`]; the control plane was handed to that
/// thread and is dropped with it, so the caller observes a closed channel.
pub fn run_bridge_with<R, C, L, T>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    default_frame_type: &str,
    parts: BridgeParts<R, C, L>,
    app_main: impl FnOnce() -> T,
) -> T
where
    R: FrameRegistry,
    C: ControlPlane + 'static,
    L: ResourceLoader<R::Frame> + 'static,
{
    match bootstrap_with(loader, reporter, default_frame_type) {
        Ok(tether) => {
            if let Err(error) = tether.spawn(parts) {
                tether.reporter().launch_failed(&error);
            }
        }
        Err(error) => {
            let BridgeParts { mut control, .. } = parts;
            if let Err(signal_error) = control.signal_error(&error.to_string()) {
                warn!(
                    target: LAUNCH_TARGET,
                    error = %signal_error,
                    "caller missed the bootstrap failure"
                );
            }
        }
    }
    app_main()
}
