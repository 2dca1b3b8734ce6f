//! Retry policy and executor
//!
//! Attempts run back to back. A stop request seen between two attempts ends
//! the sequence with [`RetryError::Stopped`].

use log::{debug, info, warn};
use std::future::Future;

#[cfg(feature = "shutdown")]
use crate::shutdown::StopSignal;

/// How many times an operation may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Retry straight away, up to `max_attempts` attempts in total
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// A single attempt, never retried
    pub fn no_retry() -> Self {
        Self::immediate(1)
    }
}

/// Trait for errors that can be retried
pub trait Retryable {
    /// Whether this error is retryable
    fn is_retryable(&self) -> bool;
}

/// Retry executor
pub struct RetryExecutor {
    policy: RetryPolicy,
    #[cfg(feature = "shutdown")]
    stop: Option<StopSignal>,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            #[cfg(feature = "shutdown")]
            stop: None,
        }
    }

    /// Start no further attempt once `signal` is set
    #[cfg(feature = "shutdown")]
    pub fn with_stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop = Some(signal);
        self
    }

    /// Execute a function with retry logic, passing the 1-based attempt number
    pub async fn execute_with_context<F, Fut, T, E>(&self, mut f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            debug!(
                "Executing attempt {} of {}",
                attempt, self.policy.max_attempts
            );

            let error = match f(attempt).await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("Operation succeeded after {} attempts", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                debug!("Operation failed with non-retryable error: {}", error);
                return Err(RetryError::NonRetryableError(error));
            }

            if attempt >= self.policy.max_attempts {
                warn!("Operation failed after {} attempts: {}", attempt, error);
                return Err(RetryError::MaxAttemptsExceeded {
                    attempts: attempt,
                    last_error: error,
                });
            }

            if self.stop_requested() {
                debug!("Stop requested, abandoning retries after attempt {}", attempt);
                return Err(RetryError::Stopped {
                    attempts: attempt,
                    last_error: error,
                });
            }

            warn!("Attempt {} failed: {}. Retrying", attempt, error);
            attempt += 1;
        }
    }

    fn stop_requested(&self) -> bool {
        #[cfg(feature = "shutdown")]
        if let Some(signal) = &self.stop {
            return signal.is_stop_requested();
        }
        false
    }
}

/// Retry error types
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts ({attempts}) exceeded. Last error: {last_error}")]
    MaxAttemptsExceeded { attempts: u32, last_error: E },

    /// Non-retryable error encountered
    #[error("Non-retryable error: {0}")]
    NonRetryableError(E),

    /// A stop was requested between attempts
    #[error("Stopped after {attempts} attempts. Last error: {last_error}")]
    Stopped { attempts: u32, last_error: E },
}

impl<E> RetryError<E> {
    /// Get the underlying error
    pub fn into_inner(self) -> E {
        match self {
            RetryError::MaxAttemptsExceeded { last_error, .. } => last_error,
            RetryError::NonRetryableError(error) => error,
            RetryError::Stopped { last_error, .. } => last_error,
        }
    }
}
