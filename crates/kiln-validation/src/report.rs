//! The streamed reporter protocol validation aggregators implement.

use crate::batch::PredictionBatch;

/// Terminal error summary for a validation run, produced by the trainer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorSummary {
    pub text: String,
}

impl ErrorSummary {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Consumer of streamed prediction batches from a validation run.
///
/// Calls arrive in a fixed order: one `start_report`, any number of
/// `report_output` calls, one `finish_report`. Calling out of order is a
/// programming error and fails fast.
pub trait ValidationReport {
    /// Begins a report over the given metadata columns and label set.
    fn start_report(&mut self, meta_cols: &[String], labels: &[String]);

    /// Consumes one batch: `ids[r]` identifies the record whose expected
    /// and output vectors are row `r` of the batches.
    ///
    /// The batches are caller-owned and may be reused for later calls;
    /// implementations must copy any values they keep.
    fn report_output(&mut self, ids: &[String], expected: &PredictionBatch, output: &PredictionBatch);

    /// Finishes the report with the trainer's error summary.
    fn finish_report(&mut self, errors: &ErrorSummary);
}
