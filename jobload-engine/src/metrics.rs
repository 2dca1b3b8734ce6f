//! Run-level counters for outcomes that never reach the event log

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every virtual user
#[derive(Debug, Default)]
pub struct RunCounters {
    pub users_started: AtomicU64,
    pub cycles: AtomicU64,
    pub create_failures: AtomicU64,
    pub window_failures: AtomicU64,
    pub timeout_retries: AtomicU64,
}

/// Point-in-time copy of [`RunCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub users_started: u64,
    pub cycles: u64,
    pub create_failures: u64,
    pub window_failures: u64,
    pub timeout_retries: u64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_user_started(&self) {
        self.users_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_create_failure(&self) {
        self.create_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_failure(&self) {
        self.window_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout_retry(&self) {
        self.timeout_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            users_started: self.users_started.load(Ordering::Relaxed),
            cycles: self.cycles.load(Ordering::Relaxed),
            create_failures: self.create_failures.load(Ordering::Relaxed),
            window_failures: self.window_failures.load(Ordering::Relaxed),
            timeout_retries: self.timeout_retries.load(Ordering::Relaxed),
        }
    }
}
