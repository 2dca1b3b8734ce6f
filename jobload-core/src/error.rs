//! Error taxonomy for job creation and window discovery

use thiserror::Error;

/// Maximum number of body characters carried in an [`JobError::HttpError`]
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors surfaced when talking to the system under test
///
/// Poll-level transient outcomes (404 and 5xx while waiting for a job) are
/// not represented here; they are recovered inside the polling loop and
/// never escape it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    /// Well-formed JSON that lacks a usable `job_id`
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Body was not JSON where JSON was expected
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Upstream answered with an error status
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Window discovery returned nothing usable
    #[error("No usable recordings in the requested range")]
    NoRecordings,
}

/// Result type alias for job operations
pub type Result<T> = std::result::Result<T, JobError>;

impl JobError {
    /// Build an [`JobError::HttpError`], truncating the body for diagnostics
    pub fn http(status: u16, body: &str) -> Self {
        JobError::HttpError {
            status,
            body: truncate_body(body),
        }
    }

    /// HTTP status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            JobError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short stable label, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::InvalidResponse(_) => "invalid_response",
            JobError::MalformedResponse(_) => "malformed_response",
            JobError::HttpError { .. } => "http_error",
            JobError::Transport(_) => "transport",
            JobError::NoRecordings => "no_recordings",
        }
    }
}

/// Truncate a response body to [`MAX_ERROR_BODY_CHARS`] characters
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Errors constructing a [`crate::TimeWindow`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("Window start ({start}) must be before end ({end})")]
    Inverted { start: i64, end: i64 },

    #[error("Window start and end must be given together")]
    HalfOpen,
}
