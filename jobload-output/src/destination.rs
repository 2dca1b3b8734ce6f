//! Sink trait and the flat row shape shared by every persisted format

use chrono::{DateTime, SecondsFormat, Utc};
use jobload_core::{EventKind, JobEvent, TimeWindow};
use serde::{Deserialize, Serialize};

use crate::errors::DeliveryError;

/// One persisted event, flattened for tabular output. Field order is the
/// CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub time: String,
    pub event: EventKind,
    pub job_id: String,
    pub attempt: u32,
    pub user: String,
    pub start_epoch: Option<i64>,
    pub end_epoch: Option<i64>,
    pub duration_ms: Option<u64>,
}

impl From<&JobEvent> for EventRow {
    fn from(event: &JobEvent) -> Self {
        Self {
            time: event.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            event: event.event,
            job_id: event.job_id.clone(),
            attempt: event.attempt,
            user: event.user.clone(),
            start_epoch: event.window.map(|w| w.start),
            end_epoch: event.window.map(|w| w.end),
            duration_ms: event.duration_ms,
        }
    }
}

impl EventRow {
    /// Rebuild the event this row was flattened from
    pub fn to_event(&self) -> Result<JobEvent, DeliveryError> {
        let time = DateTime::parse_from_rfc3339(&self.time)
            .map_err(|e| DeliveryError::parse("row", format!("time '{}': {}", self.time, e)))?
            .with_timezone(&Utc);
        let window = TimeWindow::from_bounds(self.start_epoch, self.end_epoch)
            .map_err(|e| DeliveryError::parse("row", e))?;

        Ok(JobEvent {
            time,
            event: self.event,
            job_id: self.job_id.clone(),
            attempt: self.attempt,
            window,
            duration_ms: self.duration_ms,
            user: self.user.clone(),
        })
    }
}

/// A persisted representation of the event log
pub trait EventSink: Send + Sync {
    /// Format name used in logs and failure reports
    fn name(&self) -> &'static str;

    /// File extension without the leading dot
    fn extension(&self) -> &'static str;

    /// Render the complete log
    fn render(&self, rows: &[EventRow]) -> Result<Vec<u8>, DeliveryError>;

    fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobload_core::{Job, JobId, TimeWindow};
    use std::time::Duration;

    #[test]
    fn test_row_flattens_window() {
        let job = Job::new(
            JobId::from("4-2"),
            Some(TimeWindow {
                start: 1_700_000_000,
                end: 1_700_000_060,
            }),
        );
        let row = EventRow::from(&JobEvent::completed(&job, 2, "user-1", Duration::from_millis(812)));
        assert_eq!(row.job_id, "4-2");
        assert_eq!(row.start_epoch, Some(1_700_000_000));
        assert_eq!(row.end_epoch, Some(1_700_000_060));
        assert_eq!(row.duration_ms, Some(812));
        assert!(row.time.ends_with('Z'));

        let live = Job::new(JobId::from("4-3"), None);
        let row = EventRow::from(&JobEvent::created(&live, 1, "user-1"));
        assert_eq!(row.start_epoch, None);
        assert_eq!(row.duration_ms, None);
    }

    #[test]
    fn test_row_back_to_event() {
        let job = Job::new(JobId::from("4-2"), Some(TimeWindow { start: 10, end: 70 }));
        let original = JobEvent::timeout(&job, 1, "user-3", Duration::from_secs(120));
        let event = EventRow::from(&original).to_event().unwrap();
        assert_eq!(event.job_id, "4-2");
        assert_eq!(event.window, job.window);
        assert_eq!(event.duration_ms, Some(120_000));
        assert_eq!(event.time.timestamp_millis(), original.time.timestamp_millis());
    }

    #[test]
    fn test_row_with_half_window_is_rejected() {
        let row = EventRow {
            time: "2024-01-01T00:00:00.000Z".to_string(),
            event: EventKind::Created,
            job_id: "1-1".to_string(),
            attempt: 1,
            user: "user-0".to_string(),
            start_epoch: Some(10),
            end_epoch: None,
            duration_ms: None,
        };
        assert!(matches!(row.to_event(), Err(DeliveryError::Parse { .. })));

        let row = EventRow {
            time: "yesterday".to_string(),
            start_epoch: None,
            ..row
        };
        assert!(matches!(row.to_event(), Err(DeliveryError::Parse { .. })));
    }
}
