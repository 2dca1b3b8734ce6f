//! In-memory event log with a one-shot flush

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{debug, error, info, warn};

use jobload_core::JobEvent;

use crate::destination::{EventRow, EventSink};
use crate::destinations::{write_atomic, JsonSink};
use crate::errors::DeliveryError;
use crate::metrics::RecorderMetrics;

/// Default file name stem for persisted logs
pub const DEFAULT_FILE_STEM: &str = "job_events";

/// A sink that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub sink: &'static str,
    pub error: DeliveryError,
}

/// Outcome of a flush
#[derive(Debug, Clone, Default)]
pub struct FlushReport {
    /// Number of events persisted
    pub events: usize,
    /// Files that were written
    pub written: Vec<PathBuf>,
    /// Sinks that failed, including a failed directory creation
    pub failures: Vec<SinkFailure>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Append-only log of lifecycle events shared by every virtual user
pub struct EventRecorder {
    events: Mutex<Vec<JobEvent>>,
    sinks: Vec<Box<dyn EventSink>>,
    file_stem: String,
    metrics: RecorderMetrics,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    /// Recorder with the CSV and JSON sinks
    pub fn new() -> Self {
        let mut sinks: Vec<Box<dyn EventSink>> = Vec::new();
        #[cfg(feature = "csv")]
        sinks.push(Box::new(crate::destinations::CsvSink::new()));
        sinks.push(Box::new(JsonSink::new()));
        Self::with_sinks(sinks)
    }

    pub fn with_sinks(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            sinks,
            file_stem: DEFAULT_FILE_STEM.to_string(),
            metrics: RecorderMetrics::new(),
        }
    }

    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Append one event. Never blocks on I/O.
    pub fn append(&self, event: JobEvent) {
        debug!(
            event = event.event.as_str(),
            job_id = %event.job_id,
            attempt = event.attempt,
            user = %event.user,
            "Recording job event"
        );
        self.events.lock().push(event);
        self.metrics.record_append();
    }

    /// Copy of the log in emission order
    pub fn snapshot(&self) -> Vec<JobEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn metrics(&self) -> &RecorderMetrics {
        &self.metrics
    }

    /// Paths the sinks write to under `dir`
    pub fn output_paths(&self, dir: &Path) -> Vec<PathBuf> {
        self.sinks
            .iter()
            .map(|sink| dir.join(sink.file_name(&self.file_stem)))
            .collect()
    }

    /// Persist the whole log into `dir` and clear it. Failures are logged and
    /// reported, never returned as errors.
    pub async fn flush(&self, dir: &Path) -> FlushReport {
        let started = Instant::now();
        let events = std::mem::take(&mut *self.events.lock());
        let mut report = FlushReport {
            events: events.len(),
            ..FlushReport::default()
        };

        if let Err(e) = fs::create_dir_all(dir).await {
            let error = DeliveryError::filesystem(dir, "create_dirs", e);
            error!("Cannot persist {} job events: {}", events.len(), error);
            self.metrics.record_failure();
            report.failures.push(SinkFailure {
                sink: "directory",
                error,
            });
            self.metrics.record_flush(started.elapsed());
            return report;
        }

        let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();

        for sink in &self.sinks {
            let path = dir.join(sink.file_name(&self.file_stem));
            let result = match sink.render(&rows) {
                Ok(data) => write_atomic(&path, &data).await.map(|_| data.len()),
                Err(e) => Err(e),
            };

            match result {
                Ok(bytes) => {
                    self.metrics.record_write(bytes as u64);
                    report.written.push(path);
                }
                Err(error) => {
                    warn!("Failed to write {} event log: {}", sink.name(), error);
                    self.metrics.record_failure();
                    report.failures.push(SinkFailure {
                        sink: sink.name(),
                        error,
                    });
                }
            }
        }

        self.metrics.record_flush(started.elapsed());
        info!(
            "Flushed {} job events to {} ({} files, {} failures)",
            report.events,
            dir.display(),
            report.written.len(),
            report.failures.len()
        );
        report
    }
}
