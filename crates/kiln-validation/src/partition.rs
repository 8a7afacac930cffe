//! Training/testing membership for validated records.

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The set of record ids that were used for training.
///
/// Records not in the set are the held-out testing records.
#[derive(Debug, Clone, Default)]
pub struct TrainingPartition {
    training_ids: HashSet<String>,
}

impl TrainingPartition {
    /// Builds a partition from the known training ids.
    #[must_use]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { training_ids: ids.into_iter().map(Into::into).collect() }
    }

    /// Reads a partition from a newline-delimited id file. Blank lines are
    /// skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PartitionError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_ids(
            text.lines().map(str::trim).filter(|line| !line.is_empty()),
        ))
    }

    /// Whether `id` was used for training.
    #[must_use]
    pub fn is_training(&self, id: &str) -> bool {
        self.training_ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.training_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.training_ids.is_empty()
    }
}
