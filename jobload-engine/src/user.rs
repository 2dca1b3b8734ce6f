//! Virtual users: the create/poll/think loop

use jobload_core::{JobError, JobEvent, TimeWindow};
use jobload_output::EventRecorder;
use jobload_resilience::{RetryError, RetryExecutor, RetryPolicy, Retryable, StopSignal};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::creator::{CreateError, JobCreator};
use crate::metrics::RunCounters;
use crate::poller::{PollOutcome, PollingEngine};
use crate::window::WindowResolver;

/// Why a job cycle ended without a completed job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error("job metadata poll timed out")]
    TimedOut,

    #[error("job creation failed: {0}")]
    Create(#[from] JobError),

    #[error("job status rejected with HTTP {0}")]
    Rejected(u16),

    #[error("run stopped")]
    Stopped,
}

impl Retryable for CycleError {
    /// Only a timeout earns a fresh job
    fn is_retryable(&self) -> bool {
        matches!(self, CycleError::TimedOut)
    }
}

/// Components shared by every virtual user of a run
#[derive(Clone)]
pub struct UserContext {
    pub creator: Arc<JobCreator>,
    pub poller: Arc<PollingEngine>,
    pub windows: Arc<WindowResolver>,
    pub recorder: Arc<EventRecorder>,
    pub stop: StopSignal,
    pub retry: RetryPolicy,
    pub think_time: Duration,
    pub stop_check_interval: Duration,
    pub counters: Arc<RunCounters>,
}

/// One simulated client. Resolves its window once, then runs job cycles
/// separated by a think time until the run stops.
pub struct VirtualUser {
    tag: String,
    ctx: UserContext,
    /// `Some(None)` is a resolved live window
    window: Option<Option<TimeWindow>>,
}

impl VirtualUser {
    pub fn new(tag: impl Into<String>, ctx: UserContext) -> Self {
        Self {
            tag: tag.into(),
            ctx,
            window: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Run until the stop flag is set. Returns the number of cycles run.
    pub async fn run(mut self) -> u64 {
        self.ctx.counters.record_user_started();
        info!(user = %self.tag, "Virtual user started");
        let mut cycles = 0u64;

        while !self.ctx.stop.is_stop_requested() {
            let window = match self.window {
                Some(window) => window,
                None => match self.ctx.windows.resolve().await {
                    Ok(window) => {
                        self.window = Some(window);
                        window
                    }
                    Err(e) => {
                        warn!(user = %self.tag, error = %e, "Window resolution failed");
                        self.ctx.counters.record_window_failure();
                        if self.think().await {
                            break;
                        }
                        continue;
                    }
                },
            };

            cycles += 1;
            match self.run_cycle(window).await {
                Ok(outcome) => debug!(user = %self.tag, ?outcome, "Cycle finished"),
                Err(RetryError::Stopped { .. })
                | Err(RetryError::NonRetryableError(CycleError::Stopped)) => break,
                Err(e) => debug!(user = %self.tag, error = %e, "Cycle ended without completion"),
            }

            if self.think().await {
                break;
            }
        }

        info!(user = %self.tag, cycles, "Virtual user stopped");
        cycles
    }

    /// One job cycle: create, record, poll, and start over with a fresh job
    /// while the poll times out and the policy allows another attempt
    pub async fn run_cycle(
        &self,
        window: Option<TimeWindow>,
    ) -> Result<PollOutcome, RetryError<CycleError>> {
        self.ctx.counters.record_cycle();
        RetryExecutor::new(self.ctx.retry)
            .with_stop_signal(self.ctx.stop.clone())
            .execute_with_context(move |attempt| self.attempt(window, attempt))
            .await
    }

    async fn attempt(
        &self,
        window: Option<TimeWindow>,
        attempt: u32,
    ) -> Result<PollOutcome, CycleError> {
        if attempt > 1 {
            self.ctx.counters.record_timeout_retry();
        }

        let job = match self.ctx.creator.create(window).await {
            Ok(job) => job,
            Err(CreateError::Stopped) => return Err(CycleError::Stopped),
            Err(CreateError::Job(e)) => {
                warn!(user = %self.tag, attempt, kind = e.kind(), error = %e, "Job creation failed");
                self.ctx.counters.record_create_failure();
                return Err(CycleError::Create(e));
            }
        };
        self.ctx
            .recorder
            .append(JobEvent::created(&job, attempt, &self.tag));

        match self.ctx.poller.poll(&job, attempt, &self.tag).await {
            outcome @ PollOutcome::Completed { .. } => Ok(outcome),
            PollOutcome::TimedOut { .. } => Err(CycleError::TimedOut),
            PollOutcome::Rejected { status, .. } => Err(CycleError::Rejected(status)),
            PollOutcome::Stopped => Err(CycleError::Stopped),
        }
    }

    /// Stop-aware think time; `true` if the run stopped meanwhile
    async fn think(&self) -> bool {
        self.ctx
            .stop
            .sleep(self.ctx.think_time, self.ctx.stop_check_interval)
            .await
            .is_stopped()
    }
}
