//! Adapter around the target's load-by-path capability.
//!
//! The target exposes loading only through a private entry point. Everything
//! that crosses that boundary lives behind [`ResourceLoader`], so the bridge
//! sees a plain `Result` whatever the target does underneath.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::errors::LoadError;
use crate::frame::{Frame, FrameHandle};

/// Flags forwarded with every load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replace whatever document the target currently has open.
    pub replace_existing: bool,
    /// Open the resource without write access.
    pub read_only: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            replace_existing: true,
            read_only: false,
        }
    }
}

/// Target capability that loads a resource into the captured frame.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceLoader<T: Frame>: Send {
    /// Loads `path` into the target's main frame.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing why the target could not load the
    /// resource.
    fn load_resource(
        &mut self,
        frame: &FrameHandle<T>,
        path: &Path,
        options: LoadOptions,
    ) -> Result<(), LoadError>;
}

/// Invokes the loader, converting a target panic into [`LoadError::Panicked`].
pub(crate) fn guarded_load<F, L>(
    loader: &mut L,
    frame: &FrameHandle<F>,
    path: &Path,
    options: LoadOptions,
) -> Result<(), LoadError>
where
    F: Frame,
    L: ResourceLoader<F> + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| {
        loader.load_resource(frame, path, options)
    }))
    .unwrap_or_else(|payload| Err(LoadError::panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
