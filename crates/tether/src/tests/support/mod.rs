//! Test doubles shared by the unit and behavioural suites.

mod config_loader;
mod frames;
mod loader;
mod reporter;
mod world;

pub use config_loader::{FailingConfigLoader, fast_config};
pub use frames::{MAIN_FRAME, ScriptedRegistry, TestFrame, frames_named};
pub use loader::{LoadCall, RecordingLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
