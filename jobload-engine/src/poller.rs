//! Metadata polling with capped exponential backoff
//!
//! One call to [`PollingEngine::poll`] walks a job through
//! `INITIAL_DELAY -> POLLING -> {COMPLETED | TIMED_OUT}`, with early exits
//! for a permanent rejection or a stop request. Responses are classified as:
//!
//! | response                | meaning          | action                      |
//! |-------------------------|------------------|-----------------------------|
//! | 2xx                     | ready            | record `completed`, return  |
//! | 404                     | not ready yet    | back off, poll again        |
//! | 5xx                     | server trouble   | back off, poll again        |
//! | other 4xx               | permanent        | record `failed`, return     |
//! | no response (transport) | transient        | back off, poll again        |
//!
//! The deadline is computed once, after the initial delay, as an absolute
//! instant. A stop request abandons the job without a terminal event.

use jobload_config::PollingConfig;
use jobload_core::{Job, JobEvent};
use jobload_http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use jobload_output::EventRecorder;
use jobload_resilience::{deadline_after, ExponentialBackoff, StopSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Terminal state of one polling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed { elapsed: Duration },
    TimedOut { elapsed: Duration },
    /// Permanent rejection; no point in polling further
    Rejected { status: u16, elapsed: Duration },
    /// Stop requested; no terminal event recorded
    Stopped,
}

/// Classification of a single status query
#[derive(Debug, Clone, PartialEq, Eq)]
enum PollStatus {
    Ready,
    NotReady,
    ServerError(u16),
    Rejected(u16),
    Transport(String),
}

fn classify(result: Result<HttpResponse, HttpError>) -> PollStatus {
    match result {
        Ok(response) => match response.status {
            200..=299 => PollStatus::Ready,
            404 => PollStatus::NotReady,
            status if status >= 500 => PollStatus::ServerError(status),
            status if status >= 400 => PollStatus::Rejected(status),
            // 1xx and 3xx do not say the job is ready
            _ => PollStatus::NotReady,
        },
        Err(e) => PollStatus::Transport(e.to_string()),
    }
}

/// Timing of a polling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub initial_delay: Duration,
    pub base_interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
    pub stop_check_interval: Duration,
}

impl From<&PollingConfig> for PollSchedule {
    fn from(config: &PollingConfig) -> Self {
        Self {
            initial_delay: config.initial_delay,
            base_interval: config.base_interval,
            max_interval: config.max_interval,
            timeout: config.timeout,
            stop_check_interval: config.stop_check_interval,
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        (&PollingConfig::default()).into()
    }
}

/// Polls job metadata until the job reaches a terminal state
pub struct PollingEngine {
    client: Arc<dyn HttpClient>,
    metadata_path: String,
    schedule: PollSchedule,
    stop: StopSignal,
    recorder: Arc<EventRecorder>,
}

impl PollingEngine {
    pub fn new(
        client: Arc<dyn HttpClient>,
        metadata_path: impl Into<String>,
        schedule: PollSchedule,
        stop: StopSignal,
        recorder: Arc<EventRecorder>,
    ) -> Self {
        Self {
            client,
            metadata_path: metadata_path.into(),
            schedule,
            stop,
            recorder,
        }
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    fn status_path(&self, job: &Job) -> String {
        format!("{}/{}", self.metadata_path.trim_end_matches('/'), job.id)
    }

    /// Poll `job` to a terminal state. Elapsed times are measured from the
    /// call, which immediately follows the job's creation.
    pub async fn poll(&self, job: &Job, attempt: u32, user: &str) -> PollOutcome {
        let started = Instant::now();
        let step = self.schedule.stop_check_interval;

        if self
            .stop
            .sleep(self.schedule.initial_delay, step)
            .await
            .is_stopped()
        {
            debug!(job_id = %job.id, "Stop requested during initial delay");
            return PollOutcome::Stopped;
        }

        let deadline = deadline_after(Instant::now(), self.schedule.timeout);
        let mut backoff =
            ExponentialBackoff::new(self.schedule.base_interval, self.schedule.max_interval);
        let path = self.status_path(job);
        let mut queries = 0u32;

        loop {
            if self.stop.is_stop_requested() {
                debug!(job_id = %job.id, queries, "Stop requested, abandoning job");
                return PollOutcome::Stopped;
            }
            if Instant::now() >= deadline {
                break;
            }

            queries += 1;
            let result = tokio::select! {
                result = self.client.send(HttpRequest::get(path.as_str())) => result,
                _ = self.stop.stopped(step) => {
                    debug!(job_id = %job.id, queries, "Stop requested during status query");
                    return PollOutcome::Stopped;
                }
            };

            match classify(result) {
                PollStatus::Ready => {
                    let elapsed = started.elapsed();
                    info!(
                        job_id = %job.id,
                        attempt,
                        queries,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Job completed"
                    );
                    self.recorder
                        .append(JobEvent::completed(job, attempt, user, elapsed));
                    return PollOutcome::Completed { elapsed };
                }
                PollStatus::Rejected(status) => {
                    let elapsed = started.elapsed();
                    warn!(job_id = %job.id, status, "Job status permanently rejected");
                    self.recorder
                        .append(JobEvent::failed(job, attempt, user, elapsed));
                    return PollOutcome::Rejected { status, elapsed };
                }
                PollStatus::NotReady => trace!(job_id = %job.id, "Job not ready"),
                PollStatus::ServerError(status) => {
                    debug!(job_id = %job.id, status, "Transient server error while polling")
                }
                PollStatus::Transport(error) => {
                    debug!(job_id = %job.id, %error, "Transport error while polling")
                }
            }

            let delay = backoff.next_delay();
            if self.stop.sleep(delay, step).await.is_stopped() {
                debug!(job_id = %job.id, queries, "Stop requested during backoff");
                return PollOutcome::Stopped;
            }
        }

        let elapsed = started.elapsed();
        warn!(
            job_id = %job.id,
            attempt,
            queries,
            timeout_s = self.schedule.timeout.as_secs_f64(),
            "Job metadata poll timed out"
        );
        self.recorder
            .append(JobEvent::timeout(job, attempt, user, elapsed));
        PollOutcome::TimedOut { elapsed }
    }
}
