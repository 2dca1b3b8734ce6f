//! Domain-driven configuration management for jobload
//!
//! Configuration is split by functional domain (target, load, polling,
//! retry, job, output, logging). Every domain has serde defaults, so an
//! empty YAML document is a valid configuration, and every domain is
//! validated after environment overrides are applied.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    job::JobConfig, load::LoadConfig, logging::LoggingConfig, output::OutputConfig,
    polling::PollingConfig, retry::RetryConfig, target::TargetConfig, JobloadConfig,
};

// Re-export utilities
pub use domains::utils::{serde_secs, serde_secs_option};
