//! Controller state machine and progress delivery.
//!
//! The controller is the single consumer of the worker event queue. It owns
//! the session state, the display fields the presentation shell mirrors, and
//! the enable/disable policy gated on that state. Events are applied in
//! arrival order; the queue's FIFO guarantee is the ordering contract.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, warn};

use crate::command::Command;
use crate::error::{JobError, JobResult};
use crate::progress::{score_percent, JobEvent, JobOutcome, ProgressEvent};
use crate::runner::{JobId, JobRunner};
use crate::settings::SettingsStore;

/// Platform line separator used for report text.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Session execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No job is active; operations gated on idleness are permitted.
    Idle,
    /// A worker is running a command.
    Running,
    /// A cancellation was requested; the worker may or may not honor it.
    AbortRequested,
}

impl SessionState {
    /// Checks whether the session may move to `to`.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::AbortRequested)
                | (Self::Running | Self::AbortRequested, Self::Idle)
        )
    }
}

/// Display fields mirrored by the presentation shell.
///
/// Mutated only on the controller context; the worker never touches these.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// Current status line.
    pub status: String,
    /// Results of the last training run, line-ending normalized.
    pub results: String,
    /// Current epoch.
    pub epoch: u32,
    /// Epoch of the best model saved so far. Never resets during a run.
    pub best_epoch: Option<u32>,
    /// Current score.
    pub score: f64,
    /// Score mapped onto the progress bar, in `[0, 100]`.
    pub progress_percent: i32,
    /// Whether idle-gated controls are enabled.
    pub controls_enabled: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            status: String::new(),
            results: String::new(),
            epoch: 0,
            best_epoch: None,
            score: 0.0,
            progress_percent: 0,
            controls_enabled: true,
        }
    }
}

/// Single-threaded orchestrator for background training commands.
pub struct Controller {
    state: SessionState,
    runner: JobRunner,
    events: UnboundedReceiver<JobEvent>,
    display: DisplayState,
    settings: SettingsStore,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("active_job", &self.runner.active_job_id())
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates an idle controller around an already-loaded settings store.
    #[must_use]
    pub fn new(settings: SettingsStore) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            state: SessionState::Idle,
            runner: JobRunner::new(sender),
            events,
            display: DisplayState::default(),
            settings,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    /// Starts `command` under the display name `name`.
    ///
    /// Fails with `JobAlreadyActive` unless the session is idle, and with
    /// `InvalidArguments` when the command rejects `args`; neither failure
    /// changes session state or spawns a worker.
    pub fn start_job(
        &mut self,
        name: &str,
        args: &[String],
        mut command: Box<dyn Command>,
    ) -> JobResult<JobId> {
        if self.state != SessionState::Idle {
            warn!(name = %name, state = ?self.state, "Rejected start while a job is active");
            return Err(JobError::JobAlreadyActive);
        }
        if !command.parse_args(args) {
            return Err(JobError::InvalidArguments(name.to_string()));
        }

        // Make sure the user doesn't start anything else.
        self.display.controls_enabled = false;
        self.display.status = format!("Running {name} command.");
        let id = self.runner.start(command)?;
        self.set_state(SessionState::Running);
        Ok(id)
    }

    /// Requests cooperative cancellation of the running job.
    ///
    /// Only the session state changes; the worker exits at its own polling
    /// points or not at all. Ignored unless a job is running.
    pub fn request_cancel(&mut self) {
        if self.state == SessionState::Running {
            self.runner.request_cancel();
            self.set_state(SessionState::AbortRequested);
        }
    }

    /// Applies one worker event.
    pub fn apply_event(&mut self, event: JobEvent) {
        match event {
            JobEvent::Progress(progress) => self.apply_progress(progress),
            JobEvent::Completed(outcome) => self.complete_job(&outcome),
        }
    }

    /// Applies every event already sitting in the queue without blocking.
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
        }
    }

    /// Drains events until the running job's completion notification lands.
    /// Returns immediately when no job is active.
    pub async fn run_until_idle(&mut self) {
        while self.state != SessionState::Idle {
            match self.events.recv().await {
                Some(event) => self.apply_event(event),
                None => break,
            }
        }
    }

    /// Persists the settings store; call once at shutdown.
    pub fn shutdown(&self) -> JobResult<()> {
        self.settings.save()
    }

    #[must_use]
    pub fn model_directory(&self) -> Option<&Path> {
        self.settings.model_directory()
    }

    pub fn set_model_directory(&mut self, dir: PathBuf) {
        self.settings.set_model_directory(dir);
    }

    fn apply_progress(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::StatusMessage { text } => self.display.status = text,
            ProgressEvent::ResultReport { text } => {
                self.display.results = normalize_line_endings(&text);
            }
            ProgressEvent::EpochUpdate { epoch, score, is_new_best } => {
                self.display.epoch = epoch;
                self.display.score = score;
                if is_new_best {
                    self.display.best_epoch = Some(epoch);
                }
                self.display.progress_percent = score_percent(score);
            }
        }
    }

    fn complete_job(&mut self, outcome: &JobOutcome) {
        debug!(outcome = ?outcome, "Command ended");
        self.runner.job_finished();
        self.display.progress_percent = 0;
        self.display.controls_enabled = true;
        self.set_state(SessionState::Idle);
    }

    fn set_state(&mut self, to: SessionState) {
        if !self.state.can_transition_to(to) {
            error!(from = ?self.state, to = ?to, "Invalid session transition");
            return;
        }
        debug!(from = ?self.state, to = ?to, "Session transition");
        self.state = to;
    }
}

/// Normalize `\r\n` / `\n` line endings to the host platform's convention.
fn normalize_line_endings(text: &str) -> String {
    let unix = text.replace("\r\n", "\n");
    if LINE_SEPARATOR == "\n" {
        unix
    } else {
        unix.replace('\n', LINE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use crate::command::TrainReporter;
    use crate::settings::SettingsStore;

    struct NoopCommand {
        args_ok: bool,
    }

    #[async_trait]
    impl Command for NoopCommand {
        fn parse_args(&mut self, _args: &[String]) -> bool {
            self.args_ok
        }

        async fn run(
            &mut self,
            _reporter: &dyn TrainReporter,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn controller() -> Controller {
        Controller::new(SettingsStore::ephemeral())
    }

    #[test]
    fn test_session_transitions() {
        assert!(SessionState::Idle.can_transition_to(SessionState::Running));
        assert!(SessionState::Running.can_transition_to(SessionState::AbortRequested));
        assert!(SessionState::Running.can_transition_to(SessionState::Idle));
        assert!(SessionState::AbortRequested.can_transition_to(SessionState::Idle));

        assert!(!SessionState::Idle.can_transition_to(SessionState::AbortRequested));
        assert!(!SessionState::AbortRequested.can_transition_to(SessionState::Running));
        assert!(!SessionState::Idle.can_transition_to(SessionState::Idle));
    }

    #[tokio::test]
    async fn test_invalid_arguments_leave_session_idle() {
        let mut controller = controller();
        let result = controller.start_job(
            "SEARCH",
            &["--bogus".to_string()],
            Box::new(NoopCommand { args_ok: false }),
        );
        assert!(matches!(result, Err(JobError::InvalidArguments(_))));
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(controller.display().controls_enabled);
    }

    #[tokio::test]
    async fn test_start_disables_controls_and_sets_status() {
        let mut controller = controller();
        controller.start_job("SEARCH", &[], Box::new(NoopCommand { args_ok: true })).unwrap();
        assert_eq!(controller.state(), SessionState::Running);
        assert!(!controller.display().controls_enabled);
        assert_eq!(controller.display().status, "Running SEARCH command.");

        controller.run_until_idle().await;
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(controller.display().controls_enabled);
        assert_eq!(controller.display().progress_percent, 0);
    }

    #[tokio::test]
    async fn test_events_apply_in_emission_order() {
        let mut controller = controller();

        // Applying the sequence directly must equal the state reached by
        // applying it one event at a time, whatever the delivery timing.
        let sequence = vec![
            JobEvent::Progress(ProgressEvent::StatusMessage { text: "epoch 1".to_string() }),
            JobEvent::Progress(ProgressEvent::EpochUpdate {
                epoch: 1,
                score: 0.5,
                is_new_best: true,
            }),
            JobEvent::Progress(ProgressEvent::EpochUpdate {
                epoch: 2,
                score: 0.4,
                is_new_best: false,
            }),
            JobEvent::Progress(ProgressEvent::ResultReport { text: "line1\r\nline2".to_string() }),
        ];
        for event in sequence {
            controller.apply_event(event);
        }

        let display = controller.display();
        assert_eq!(display.status, "epoch 1");
        assert_eq!(display.epoch, 2);
        assert_eq!(display.best_epoch, Some(1));
        assert_eq!(display.results, format!("line1{LINE_SEPARATOR}line2"));
    }

    #[test]
    fn test_normalize_line_endings() {
        let text = "a\r\nb\nc";
        assert_eq!(
            normalize_line_endings(text),
            format!("a{LINE_SEPARATOR}b{LINE_SEPARATOR}c")
        );
    }
}
