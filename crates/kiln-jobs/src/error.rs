use thiserror::Error;

pub type JobResult<T> = std::result::Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    /// A command is already running; at most one job may be active.
    #[error("a command is already running")]
    JobAlreadyActive,

    /// The command rejected its argument combination.
    #[error("invalid parameter combination for command '{0}'")]
    InvalidArguments(String),

    #[error("malformed settings file: {0}")]
    MalformedSettings(#[from] toml::de::Error),

    #[error("failed to encode settings: {0}")]
    EncodeSettings(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
