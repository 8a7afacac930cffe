//! Single-worker background job execution.
//!
//! The runner owns at most one worker task at a time. The worker never
//! touches display state; it reports through the event queue and posts
//! exactly one completion notification when the command exits, whether it
//! succeeded, failed, or ignored a cancellation request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::command::{ChannelReporter, Command};
use crate::error::{JobError, JobResult};
use crate::progress::{JobEvent, JobOutcome};

/// Identifier for a background job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Bookkeeping for the one live worker.
struct ActiveJob {
    id: JobId,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
}

/// Runs exactly one command at a time on a dedicated worker task.
pub struct JobRunner {
    events: UnboundedSender<JobEvent>,
    active: Option<ActiveJob>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("active", &self.active.as_ref().map(|job| &job.id))
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    /// Creates a runner that delivers worker events over `events`.
    #[must_use]
    pub fn new(events: UnboundedSender<JobEvent>) -> Self {
        Self { events, active: None }
    }

    /// Starts a command on a fresh worker task.
    ///
    /// Fails with `JobAlreadyActive` while a job is active. An `Err` from
    /// the command is logged and reported as a failed completion; it is
    /// never propagated as a crash.
    pub fn start(&mut self, mut command: Box<dyn Command>) -> JobResult<JobId> {
        if self.active.is_some() {
            return Err(JobError::JobAlreadyActive);
        }

        let id = JobId::new();
        let cancel = CancellationToken::new();
        let events = self.events.clone();
        let token = cancel.clone();
        let job_id = id.clone();

        tokio::spawn(async move {
            let reporter = ChannelReporter::new(events.clone());
            let outcome = match command.run(&reporter, &token).await {
                Ok(()) => JobOutcome::Succeeded,
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Error running command");
                    JobOutcome::Failed { message: e.to_string() }
                }
            };
            // The single completion notification. Draining it is the only
            // way the session returns to idle.
            let _ = events.send(JobEvent::Completed(outcome));
        });

        let started_at = Utc::now();
        debug!(job_id = %id, "Worker task spawned");
        self.active = Some(ActiveJob { id: id.clone(), started_at, cancel });
        Ok(id)
    }

    /// Asks the running command to stop.
    ///
    /// Advisory only: the command must observe the token and exit; a command
    /// that never checks runs to natural completion. There is no forced
    /// termination.
    pub fn request_cancel(&self) {
        if let Some(job) = &self.active {
            info!(job_id = %job.id, "Cancellation requested");
            job.cancel.cancel();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active_job_id(&self) -> Option<&JobId> {
        self.active.as_ref().map(|job| &job.id)
    }

    /// Releases the worker slot once the completion event has been drained.
    pub(crate) fn job_finished(&mut self) {
        if let Some(job) = self.active.take() {
            let elapsed = Utc::now() - job.started_at;
            debug!(
                job_id = %job.id,
                elapsed_ms = elapsed.num_milliseconds(),
                "Worker slot released"
            );
        }
    }
}
