//! Target-side frame discovery.
//!
//! The host application exposes no "window created" hook, so readiness is
//! inferred by scanning its live top-level frames for one whose concrete
//! runtime type matches a known identifier.

use std::fmt;

/// A top-level frame owned by the target application.
pub trait Frame: Send + 'static {
    /// Fully-qualified name of the frame's concrete runtime type.
    fn type_name(&self) -> &str;
}

/// Live registry of the target's top-level frames.
///
/// Implementations must return a fresh snapshot on every call; the monitor
/// polls this repeatedly until the target's main frame appears.
pub trait FrameRegistry: Send + 'static {
    /// Frame type handed out by this registry.
    type Frame: Frame;

    /// Returns the currently visible top-level frames.
    fn top_level_frames(&self) -> Vec<Self::Frame>;
}

/// Predicate selecting the target's main frame by runtime type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMatcher {
    type_name: String,
}

impl FrameMatcher {
    /// Builds a matcher for the given fully-qualified type name.
    pub fn type_name(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Identifier this matcher compares against.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.type_name
    }

    /// Returns `true` when the frame's runtime type equals the identifier.
    pub fn matches<F: Frame>(&self, frame: &F) -> bool {
        frame.type_name() == self.type_name
    }
}

impl fmt::Display for FrameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

/// Captured reference to the target's main frame.
///
/// The handle is immutable once captured. It moves from the monitor to the
/// bridge exactly once and is then owned by the bridge for the rest of the
/// process lifetime.
#[derive(Debug)]
pub struct FrameHandle<F> {
    frame: F,
}

impl<F: Frame> FrameHandle<F> {
    pub(crate) const fn new(frame: F) -> Self {
        Self { frame }
    }

    /// Borrows the underlying frame.
    pub const fn frame(&self) -> &F {
        &self.frame
    }

    /// Runtime type name of the captured frame.
    pub fn type_name(&self) -> &str {
        self.frame.type_name()
    }
}

/// Scans one registry snapshot and captures the first matching frame.
pub fn find_matching<R: FrameRegistry>(
    registry: &R,
    matcher: &FrameMatcher,
) -> Option<FrameHandle<R::Frame>> {
    registry
        .top_level_frames()
        .into_iter()
        .find(|frame| matcher.matches(frame))
        .map(FrameHandle::new)
}
