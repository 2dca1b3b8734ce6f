//! # Jobload Output
//!
//! The [`EventRecorder`] collects job lifecycle events in memory while a run
//! is in progress and persists them once, at run end, through a set of
//! [`EventSink`]s (CSV and JSON by default). Each sink renders the whole log
//! and is written to a temporary file that is renamed into place, so a failing
//! sink never leaves a partial file behind or affects the other sinks.

pub mod destination;
pub mod destinations;
pub mod errors;
pub mod metrics;
pub mod recorder;

pub use destination::{EventRow, EventSink};
pub use destinations::{write_atomic, JsonSink};
#[cfg(feature = "csv")]
pub use destinations::CsvSink;
pub use errors::DeliveryError;
pub use metrics::{RecorderMetrics, RecorderStats};
pub use recorder::{EventRecorder, FlushReport, SinkFailure};
