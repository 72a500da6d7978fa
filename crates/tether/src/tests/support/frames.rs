//! Frame and registry doubles.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::frame::{Frame, FrameRegistry};

/// Type name the test host uses for its main frame.
pub const MAIN_FRAME: &str = "app.gui.MainFrame";

/// Frame identified by a type name and a numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFrame {
    type_name: String,
    id: u32,
}

impl TestFrame {
    pub fn new(type_name: &str, id: u32) -> Self {
        Self {
            type_name: type_name.to_owned(),
            id,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Frame for TestFrame {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Builds frames with ids counting up from one.
pub fn frames_named(names: &[&str]) -> Vec<TestFrame> {
    names
        .iter()
        .zip(1..)
        .map(|(name, id)| TestFrame::new(name, id))
        .collect()
}

#[derive(Debug)]
struct Script {
    polls: AtomicU32,
    appears_on: Option<u32>,
    background: Vec<TestFrame>,
    arriving: Vec<TestFrame>,
}

/// Registry whose frames show up from a given poll onwards.
///
/// Clones share the poll counter, so a test can keep one clone while the
/// monitor owns another.
#[derive(Debug, Clone)]
pub struct ScriptedRegistry {
    script: Arc<Script>,
}

impl ScriptedRegistry {
    /// Registry that only ever shows unrelated frames.
    pub fn never() -> Self {
        Self::build(None, Vec::new())
    }

    /// Registry where `arriving` frames are visible from poll `attempt` on.
    pub fn appearing_on(attempt: u32, arriving: Vec<TestFrame>) -> Self {
        Self::build(Some(attempt), arriving)
    }

    /// Registry where the main frame is visible from poll `attempt` on.
    pub fn main_frame_on(attempt: u32) -> Self {
        Self::appearing_on(attempt, vec![TestFrame::new(MAIN_FRAME, 1)])
    }

    fn build(appears_on: Option<u32>, arriving: Vec<TestFrame>) -> Self {
        Self {
            script: Arc::new(Script {
                polls: AtomicU32::new(0),
                appears_on,
                background: vec![TestFrame::new("app.gui.SplashScreen", 100)],
                arriving,
            }),
        }
    }

    /// Number of snapshots taken so far.
    pub fn polls(&self) -> u32 {
        self.script.polls.load(Ordering::SeqCst)
    }
}

impl FrameRegistry for ScriptedRegistry {
    type Frame = TestFrame;

    fn top_level_frames(&self) -> Vec<TestFrame> {
        let poll = self.script.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut frames = self.script.background.clone();
        if self.script.appears_on.is_some_and(|attempt| poll >= attempt) {
            frames.extend(self.script.arriving.iter().cloned());
        }
        frames
    }
}
