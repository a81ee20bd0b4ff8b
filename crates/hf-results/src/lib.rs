//! hf-results: on-disk repository of simulation snapshots.

pub mod naming;
pub mod store;
pub mod types;

pub use naming::{parse_run_name, run_full_name, TIMESTAMP_FORMAT};
pub use store::{RunStore, DEFAULT_DATA_DIR};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid run name: {0}")]
    InvalidRunName(String),

    #[error("Snapshot {index} at t={time_s} is earlier than the one before it")]
    UnorderedSnapshots { index: usize, time_s: f64 },

    #[error("Snapshot {index} is malformed: {message}")]
    InvalidSnapshot { index: usize, message: String },
}
