//! Counters for event recording and flushing

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time copy of [`RecorderMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecorderStats {
    pub events_appended: u64,
    pub flushes: u64,
    pub files_written: u64,
    pub failed_writes: u64,
    pub bytes_written: u64,
    pub flush_time_ms: u64,
}

/// Recorder counters, updated lock-free
#[derive(Debug, Default)]
pub struct RecorderMetrics {
    pub events_appended: AtomicU64,
    pub flushes: AtomicU64,
    pub files_written: AtomicU64,
    pub failed_writes: AtomicU64,
    pub bytes_written: AtomicU64,
    pub total_flush_time: AtomicU64, // in milliseconds
}

impl RecorderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_append(&self) {
        self.events_appended.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one sink file written successfully
    pub fn record_write(&self, bytes: u64) {
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flush(&self, elapsed: Duration) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.total_flush_time
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn appended(&self) -> u64 {
        self.events_appended.load(Ordering::Relaxed)
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    pub fn written_count(&self) -> u64 {
        self.files_written.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> RecorderStats {
        RecorderStats {
            events_appended: self.appended(),
            flushes: self.flush_count(),
            files_written: self.written_count(),
            failed_writes: self.failure_count(),
            bytes_written: self.total_bytes(),
            flush_time_ms: self.total_flush_time.load(Ordering::Relaxed),
        }
    }
}
