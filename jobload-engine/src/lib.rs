//! Jobload Engine
//!
//! Drives a target system with concurrent virtual users. Each user resolves
//! a time window once, then repeatedly creates a job through the
//! [`ConcurrencyGate`], polls it to a terminal state with capped exponential
//! backoff, and records every lifecycle transition in the shared
//! [`EventRecorder`](jobload_output::EventRecorder). The [`RunController`]
//! owns the run-wide stop signal and the single end-of-run flush.

pub mod controller;
pub mod creator;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod poller;
pub mod runner;
pub mod user;
pub mod window;

// Re-export main types
pub use controller::RunController;
pub use creator::{CreateError, JobCreator};
pub use error::{EngineError, EngineResult};
pub use gate::{ConcurrencyGate, GatePermit};
pub use metrics::{CounterSnapshot, RunCounters};
pub use poller::{PollOutcome, PollSchedule, PollingEngine};
pub use runner::{LoadRunner, RunReport};
pub use user::{CycleError, UserContext, VirtualUser};
pub use window::{WindowResolver, WindowSource};
