//! Logging setup for jobload
//!
//! Every crate logs through `tracing` macros (the resilience crate through
//! `log`, which the fmt subscriber bridges). This crate only installs the
//! global subscriber, once, from the logging configuration.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
