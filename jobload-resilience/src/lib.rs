//! Resilience primitives for jobload
//!
//! This crate provides the capped exponential backoff used by the polling
//! loop, the cooperative stop signal every sleeping loop observes, and the
//! retry executor that re-runs a whole job attempt after a timeout.

#[cfg(feature = "backoff")]
pub mod backoff;
#[cfg(feature = "retry")]
pub mod retry;
#[cfg(feature = "shutdown")]
pub mod shutdown;

// Re-export commonly used types
#[cfg(feature = "backoff")]
pub use backoff::ExponentialBackoff;
#[cfg(feature = "retry")]
pub use retry::{RetryError, RetryExecutor, RetryPolicy, Retryable};
#[cfg(feature = "shutdown")]
pub use shutdown::{deadline_after, SleepOutcome, StopSignal};
