//! HTTP client functionality for jobload
//!
//! The engine talks to the target through the [`HttpClient`] trait. [`HttpManager`]
//! is the `reqwest` implementation used for real runs; with the `testing` feature
//! [`ScriptedClient`] replays canned responses per route and records request timing.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod scripted;

// Re-export main types for convenience
pub use client::{HttpClient, HttpManager};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpRequest, HttpResponse};

#[cfg(any(test, feature = "testing"))]
pub use scripted::{RequestRecord, ScriptedClient, ScriptedResponse};
