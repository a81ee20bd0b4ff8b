//! Error types for the post-processing layer.

use hf_results::ResultsError;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Requested time {requested} is beyond the last stored snapshot at {last}")]
    OutOfRange { requested: f64, last: f64 },

    #[error("Run has no stored snapshots")]
    EmptyRepository,

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Field '{field}' was not recorded (snapshot at t={time_s})")]
    UnsupportedField { field: String, time_s: f64 },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PostResult<T> = Result<T, PostError>;

impl From<ResultsError> for PostError {
    fn from(err: ResultsError) -> Self {
        match err {
            ResultsError::RunNotFound { run_id } => PostError::RunNotFound(run_id),
            other => PostError::Results(other.to_string()),
        }
    }
}

impl From<hf_core::HfError> for PostError {
    fn from(err: hf_core::HfError) -> Self {
        PostError::InvalidInput(err.to_string())
    }
}
