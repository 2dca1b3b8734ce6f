//! Output error types

use thiserror::Error;

/// Errors raised while persisting the event log
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Filesystem {operation} failed for {path}: {error}")]
    Filesystem {
        path: String,
        operation: String,
        error: String,
    },

    #[error("Failed to serialize {format}: {error}")]
    Serialization { format: String, error: String },

    #[error("Failed to read {format} event log: {error}")]
    Parse { format: String, error: String },
}

impl DeliveryError {
    pub(crate) fn filesystem(path: &std::path::Path, operation: &str, error: impl ToString) -> Self {
        DeliveryError::Filesystem {
            path: path.to_string_lossy().to_string(),
            operation: operation.to_string(),
            error: error.to_string(),
        }
    }

    pub(crate) fn serialization(format: &str, error: impl ToString) -> Self {
        DeliveryError::Serialization {
            format: format.to_string(),
            error: error.to_string(),
        }
    }

    pub(crate) fn parse(format: &str, error: impl ToString) -> Self {
        DeliveryError::Parse {
            format: format.to_string(),
            error: error.to_string(),
        }
    }
}
