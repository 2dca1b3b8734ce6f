//! Run summaries derived from a persisted event log

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::event::{EventKind, JobEvent};

/// Counts derived from a run's event log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created: u64,
    pub completed: u64,
    pub timeouts: u64,
    pub failed: u64,
    /// Jobs created but never given a terminal event (run stopped mid-poll)
    pub abandoned: u64,
    /// Jobs created on a retry attempt after an earlier timeout
    pub retried: u64,
    pub users: u64,
}

impl RunSummary {
    pub fn from_events(events: &[JobEvent]) -> Self {
        let mut summary = RunSummary::default();
        let mut open: HashSet<&str> = HashSet::new();
        let mut users: HashSet<&str> = HashSet::new();

        for event in events {
            users.insert(event.user.as_str());
            match event.event {
                EventKind::Created => {
                    summary.created += 1;
                    if event.attempt > 1 {
                        summary.retried += 1;
                    }
                    open.insert(event.job_id.as_str());
                }
                EventKind::Completed => summary.completed += 1,
                EventKind::Timeout => summary.timeouts += 1,
                EventKind::Failed => summary.failed += 1,
            }
            if event.event.is_terminal() {
                open.remove(event.job_id.as_str());
            }
        }

        summary.abandoned = open.len() as u64;
        summary.users = users.len() as u64;
        summary
    }

    /// Share of created jobs that completed, in percent
    pub fn completion_rate(&self) -> f64 {
        if self.created == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.created as f64) * 100.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} completed={} timeouts={} failed={} abandoned={} retried={} users={} ({:.1}% completed)",
            self.created,
            self.completed,
            self.timeouts,
            self.failed,
            self.abandoned,
            self.retried,
            self.users,
            self.completion_rate()
        )
    }
}

/// A terminal event that is not preceded by exactly one `created` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    pub index: usize,
    pub job_id: String,
    pub event: EventKind,
}

/// Find terminal events whose job has no earlier `created` event, or that
/// follow another terminal event for the same job.
pub fn check_lifecycle_order(events: &[JobEvent]) -> Vec<OrderViolation> {
    let mut state: HashMap<&str, bool> = HashMap::new();
    let mut violations = Vec::new();

    for (index, event) in events.iter().enumerate() {
        let job = event.job_id.as_str();
        if event.event == EventKind::Created {
            state.insert(job, false);
            continue;
        }
        match state.get_mut(job) {
            Some(finished) if !*finished => *finished = true,
            _ => violations.push(OrderViolation {
                index,
                job_id: event.job_id.clone(),
                event: event.event,
            }),
        }
    }

    violations
}
