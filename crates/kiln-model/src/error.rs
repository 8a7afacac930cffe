use std::path::PathBuf;
use thiserror::Error;

pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The directory has no label file.
    #[error("model directory has no label file: {0}")]
    MissingLabelsFile(PathBuf),

    /// The directory has no training table.
    #[error("model directory has no training file: {0}")]
    MissingTrainingFile(PathBuf),

    /// The training table has no header row.
    #[error("training file is empty: {0}")]
    EmptyTrainingFile(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
