//! Error types for run setup and orchestration

use thiserror::Error;

/// Errors that prevent a run from starting or finishing cleanly. Per-job
/// failures are [`jobload_core::JobError`]s and never escape a virtual user.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] jobload_config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] jobload_http::HttpError),

    #[error("Invalid time window: {0}")]
    Window(#[from] jobload_core::WindowError),

    #[error("Task join error: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
