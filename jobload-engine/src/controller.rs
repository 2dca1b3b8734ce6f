//! Run lifecycle: stop flag ownership and the end-of-run flush

use jobload_output::{EventRecorder, FlushReport};
use jobload_resilience::StopSignal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the run-wide [`StopSignal`] and flushes the event log exactly once
/// when the run stops
pub struct RunController {
    stop: StopSignal,
    recorder: Arc<EventRecorder>,
    output_dir: PathBuf,
    flushed: AtomicBool,
}

impl RunController {
    pub fn new(recorder: Arc<EventRecorder>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            stop: StopSignal::new(),
            recorder,
            output_dir: output_dir.into(),
            flushed: AtomicBool::new(false),
        }
    }

    /// Handle every loop of the run observes
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn recorder(&self) -> &Arc<EventRecorder> {
        &self.recorder
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_stop_requested()
    }

    /// Clear the stop flag and make sure the output directory exists. A
    /// directory that cannot be created is only a warning here; the flush
    /// reports it again.
    pub async fn on_start(&self) {
        self.stop.reset();
        self.flushed.store(false, Ordering::Release);

        match tokio::fs::create_dir_all(&self.output_dir).await {
            Ok(()) => debug!(dir = %self.output_dir.display(), "Output directory ready"),
            Err(e) => warn!(
                dir = %self.output_dir.display(),
                error = %e,
                "Cannot prepare output directory"
            ),
        }
        info!("Run started");
    }

    /// Set the stop flag. Returns `true` only for the call that flipped it.
    pub fn request_stop(&self) -> bool {
        self.stop.request_stop()
    }

    /// Stop the run and persist the event log. Only the first call flushes;
    /// later calls return `None`.
    pub async fn on_stop(&self) -> Option<FlushReport> {
        self.request_stop();

        if self.flushed.swap(true, Ordering::AcqRel) {
            debug!("Event log already flushed");
            return None;
        }

        let report = self.recorder.flush(&self.output_dir).await;
        info!(
            events = report.events,
            files = report.written.len(),
            failures = report.failures.len(),
            "Run stopped"
        );
        Some(report)
    }
}
