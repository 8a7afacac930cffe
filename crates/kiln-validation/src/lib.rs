//! Kiln Validation
//!
//! Stream-accumulation of prediction batches from a validation run:
//! - `ConfusionAggregator` builds training/testing confusion matrices
//! - `ScatterAggregator` collects per-record expected/output vectors
//! - `TrainingPartition` splits records into training and testing sets

pub mod batch;
pub mod confusion;
pub mod partition;
pub mod report;
pub mod scatter;

pub use batch::PredictionBatch;
pub use confusion::{ConfusionAggregator, MatrixKind};
pub use partition::{PartitionError, TrainingPartition};
pub use report::{ErrorSummary, ValidationReport};
pub use scatter::{ScatterAggregator, ScatterPoint};
