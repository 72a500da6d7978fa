//! Loader double that records every dispatch.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::LoadError;
use crate::frame::FrameHandle;
use crate::target::{LoadOptions, ResourceLoader};

use super::frames::TestFrame;

/// One recorded call to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCall {
    pub path: PathBuf,
    pub options: LoadOptions,
    pub frame_id: u32,
}

#[derive(Debug, Default)]
struct LoaderState {
    calls: Vec<LoadCall>,
    failures: HashMap<PathBuf, String>,
    panics: HashSet<PathBuf>,
}

/// Records loads and fails or panics on configured paths.
///
/// Clones share state so assertions can run after the bridge takes ownership.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    state: Arc<Mutex<LoaderState>>,
}

impl RecordingLoader {
    pub fn fail_on(&self, path: &str, reason: &str) {
        self.state
            .lock()
            .expect("loader mutex poisoned")
            .failures
            .insert(PathBuf::from(path), reason.to_owned());
    }

    pub fn panic_on(&self, path: &str) {
        self.state
            .lock()
            .expect("loader mutex poisoned")
            .panics
            .insert(PathBuf::from(path));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<LoadCall> {
        self.state.lock().expect("loader mutex poisoned").calls.clone()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.calls().into_iter().map(|call| call.path).collect()
    }
}

impl ResourceLoader<TestFrame> for RecordingLoader {
    fn load_resource(
        &mut self,
        frame: &FrameHandle<TestFrame>,
        path: &Path,
        options: LoadOptions,
    ) -> Result<(), LoadError> {
        let (failure, should_panic) = {
            let mut state = self.state.lock().expect("loader mutex poisoned");
            state.calls.push(LoadCall {
                path: path.to_path_buf(),
                options,
                frame_id: frame.frame().id(),
            });
            (state.failures.get(path).cloned(), state.panics.contains(path))
        };

        if should_panic {
            panic!("loader exploded on {}", path.display());
        }
        failure.map_or(Ok(()), |reason| Err(LoadError::rejected(reason)))
    }
}
