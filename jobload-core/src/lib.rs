//! Core domain models for jobload
//!
//! This crate defines the vocabulary shared by every other jobload crate:
//! the [`Job`] handle returned by the target system, the [`JobEvent`]
//! lifecycle records persisted at the end of a run, and the [`JobError`]
//! taxonomy produced at the HTTP boundary. It has no async or I/O
//! dependencies.

pub mod error;
pub mod event;
pub mod job;
pub mod summary;

// Re-export commonly used types at the crate root
pub use error::{JobError, Result, WindowError};
pub use event::{EventKind, JobEvent};
pub use job::{Job, JobId, TimeWindow};
pub use summary::{check_lifecycle_order, OrderViolation, RunSummary};
