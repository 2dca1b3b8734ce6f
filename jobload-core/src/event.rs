//! Job lifecycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::job::{Job, TimeWindow};

/// Kind of lifecycle event recorded for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The target accepted a configure request and returned a job id
    Created,
    /// The job's metadata became available
    Completed,
    /// The polling deadline elapsed without the job becoming ready
    Timeout,
    /// The target permanently rejected a status query (non-404 4xx)
    Failed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Completed => "completed",
            EventKind::Timeout => "timeout",
            EventKind::Failed => "failed",
        }
    }

    /// Whether this event ends a job's lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventKind::Created)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the run's append-only event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    pub time: DateTime<Utc>,
    pub event: EventKind,
    pub job_id: String,
    /// 1-based attempt number within a create/poll retry sequence
    pub attempt: u32,
    pub window: Option<TimeWindow>,
    pub duration_ms: Option<u64>,
    /// Tag of the virtual user that emitted the event
    pub user: String,
}

impl JobEvent {
    fn for_job(job: &Job, event: EventKind, attempt: u32, user: &str) -> Self {
        Self {
            time: Utc::now(),
            event,
            job_id: job.id.to_string(),
            attempt,
            window: job.window,
            duration_ms: None,
            user: user.to_string(),
        }
    }

    pub fn created(job: &Job, attempt: u32, user: &str) -> Self {
        Self::for_job(job, EventKind::Created, attempt, user)
    }

    pub fn completed(job: &Job, attempt: u32, user: &str, elapsed: Duration) -> Self {
        Self::for_job(job, EventKind::Completed, attempt, user).with_duration(elapsed)
    }

    pub fn timeout(job: &Job, attempt: u32, user: &str, elapsed: Duration) -> Self {
        Self::for_job(job, EventKind::Timeout, attempt, user).with_duration(elapsed)
    }

    pub fn failed(job: &Job, attempt: u32, user: &str, elapsed: Duration) -> Self {
        Self::for_job(job, EventKind::Failed, attempt, user).with_duration(elapsed)
    }

    fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = Some(elapsed.as_millis() as u64);
        self
    }
}
