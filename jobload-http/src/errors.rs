//! HTTP error types

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection-level failure injected by a scripted client
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl HttpError {
    /// Whether the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::NetworkError(_) | HttpError::Timeout(_) | HttpError::Connection(_)
        )
    }
}
