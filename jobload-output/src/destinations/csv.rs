//! CSV sink

use crate::destination::{EventRow, EventSink};
use crate::errors::DeliveryError;

/// Column order written when the log is empty
pub const CSV_HEADER: [&str; 8] = [
    "time",
    "event",
    "job_id",
    "attempt",
    "user",
    "start_epoch",
    "end_epoch",
    "duration_ms",
];

/// One header row followed by one row per event; absent values are empty
/// cells
#[derive(Debug, Clone, Default)]
pub struct CsvSink;

impl CsvSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, rows: &[EventRow]) -> Result<Vec<u8>, DeliveryError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(!rows.is_empty())
            .from_writer(Vec::new());

        if rows.is_empty() {
            wtr.write_record(CSV_HEADER)
                .map_err(|e| DeliveryError::serialization(self.name(), e))?;
        }

        for row in rows {
            wtr.serialize(row)
                .map_err(|e| DeliveryError::serialization(self.name(), e))?;
        }

        wtr.into_inner()
            .map_err(|e| DeliveryError::serialization(self.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobload_core::EventKind;

    fn row(event: EventKind, window: Option<(i64, i64)>, duration_ms: Option<u64>) -> EventRow {
        EventRow {
            time: "2024-01-01T00:00:00.000Z".to_string(),
            event,
            job_id: "12-7".to_string(),
            attempt: 1,
            user: "user-3".to_string(),
            start_epoch: window.map(|w| w.0),
            end_epoch: window.map(|w| w.1),
            duration_ms,
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let rows = vec![
            row(EventKind::Created, Some((100, 160)), None),
            row(EventKind::Completed, Some((100, 160)), Some(2500)),
        ];
        let text = String::from_utf8(CsvSink::new().render(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(lines[1], "2024-01-01T00:00:00.000Z,created,12-7,1,user-3,100,160,");
        assert_eq!(lines[2], "2024-01-01T00:00:00.000Z,completed,12-7,1,user-3,100,160,2500");
    }

    #[test]
    fn test_empty_log_still_has_header() {
        let text = String::from_utf8(CsvSink::new().render(&[]).unwrap()).unwrap();
        assert_eq!(text.trim_end(), CSV_HEADER.join(","));
    }
}
