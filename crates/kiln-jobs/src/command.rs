//! The command boundary between the controller and an external trainer.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::progress::{JobEvent, ProgressEvent};

/// A unit of background work (a training search, a cross-validation run).
#[async_trait]
pub trait Command: Send {
    /// Validate the argument combination. Returns `false` on an invalid
    /// combination instead of raising an error.
    fn parse_args(&mut self, args: &[String]) -> bool;

    /// Execute the command, reporting progress through `reporter`.
    ///
    /// Cancellation is cooperative: the command observes `cancel` at its own
    /// polling points, or runs to natural completion if it never checks.
    /// An `Err` return is caught at the runner boundary and treated as a
    /// normal (failed) completion.
    async fn run(
        &mut self,
        reporter: &dyn TrainReporter,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()>;
}

/// Progress callbacks a command invokes while it runs.
pub trait TrainReporter: Send + Sync {
    /// Replace the status line.
    fn show_message(&self, text: &str);

    /// Replace the results paragraph.
    fn show_results(&self, text: &str);

    /// Report an epoch and its score; `is_new_best` marks a saved model.
    fn display_epoch(&self, epoch: u32, score: f64, is_new_best: bool);
}

/// Reporter that forwards each callback onto the controller's event queue,
/// preserving emission order.
pub struct ChannelReporter {
    events: UnboundedSender<JobEvent>,
}

impl ChannelReporter {
    #[must_use]
    pub fn new(events: UnboundedSender<JobEvent>) -> Self {
        Self { events }
    }

    fn send(&self, event: ProgressEvent) {
        // A closed queue means the controller is gone; there is nobody left
        // to report to.
        let _ = self.events.send(JobEvent::Progress(event));
    }
}

impl TrainReporter for ChannelReporter {
    fn show_message(&self, text: &str) {
        self.send(ProgressEvent::StatusMessage { text: text.to_string() });
    }

    fn show_results(&self, text: &str) {
        self.send(ProgressEvent::ResultReport { text: text.to_string() });
    }

    fn display_epoch(&self, epoch: u32, score: f64, is_new_best: bool) {
        self.send(ProgressEvent::EpochUpdate { epoch, score, is_new_best });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_channel_reporter_preserves_emission_order() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let reporter = ChannelReporter::new(sender);

        reporter.show_message("starting");
        reporter.display_epoch(1, 0.5, true);
        reporter.show_results("done");

        match receiver.try_recv().unwrap() {
            JobEvent::Progress(ProgressEvent::StatusMessage { text }) => {
                assert_eq!(text, "starting");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match receiver.try_recv().unwrap() {
            JobEvent::Progress(ProgressEvent::EpochUpdate { epoch, is_new_best, .. }) => {
                assert_eq!(epoch, 1);
                assert!(is_new_best);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match receiver.try_recv().unwrap() {
            JobEvent::Progress(ProgressEvent::ResultReport { text }) => {
                assert_eq!(text, "done");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
