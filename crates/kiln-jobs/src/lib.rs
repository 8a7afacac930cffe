//! Kiln Jobs
//!
//! Background execution of training commands:
//! - A single-worker job runner with cooperative cancellation (`JobRunner`)
//! - Ordered progress delivery over one event queue (`JobEvent`)
//! - The controller state machine owning all display state (`Controller`)
//! - A file-backed settings store (`SettingsStore`)

pub mod command;
pub mod controller;
pub mod error;
pub mod progress;
pub mod runner;
pub mod settings;

pub use command::{ChannelReporter, Command, TrainReporter};
pub use controller::{Controller, DisplayState, SessionState};
pub use error::{JobError, JobResult};
pub use progress::{score_percent, JobEvent, JobOutcome, ProgressEvent};
pub use runner::{JobId, JobRunner};
pub use settings::{Settings, SettingsStore, WindowGeometry};
