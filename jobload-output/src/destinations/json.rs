//! JSON array sink

use jobload_core::JobEvent;

use crate::destination::{EventRow, EventSink};
use crate::errors::DeliveryError;

/// Pretty-printed JSON array of event objects
#[derive(Debug, Clone, Default)]
pub struct JsonSink {
    compact: bool,
}

impl JsonSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Read back a log written by this sink
    pub fn read_events(data: &[u8]) -> Result<Vec<JobEvent>, DeliveryError> {
        let rows: Vec<EventRow> =
            serde_json::from_slice(data).map_err(|e| DeliveryError::parse("json", e))?;
        rows.iter().map(EventRow::to_event).collect()
    }
}

impl EventSink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, rows: &[EventRow]) -> Result<Vec<u8>, DeliveryError> {
        let rendered = if self.compact {
            serde_json::to_vec(rows)
        } else {
            serde_json::to_vec_pretty(rows)
        };
        rendered.map_err(|e| DeliveryError::serialization(self.name(), e))
    }
}
