//! Event sink implementations

#[cfg(feature = "csv")]
pub mod csv;
pub mod filesystem;
pub mod json;

#[cfg(feature = "csv")]
pub use self::csv::CsvSink;
pub use filesystem::write_atomic;
pub use json::JsonSink;
