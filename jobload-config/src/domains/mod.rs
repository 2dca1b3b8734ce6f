//! Domain-specific configuration modules

pub mod job;
pub mod load;
pub mod logging;
pub mod output;
pub mod polling;
pub mod retry;
pub mod target;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Complete jobload configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobloadConfig {
    /// System under test
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Virtual user population and pacing
    #[serde(default)]
    pub load: load::LoadConfig,

    /// Metadata polling schedule
    #[serde(default)]
    pub polling: polling::PollingConfig,

    /// Retry-on-timeout behaviour
    #[serde(default)]
    pub retry: retry::RetryConfig,

    /// Job request parameters
    #[serde(default)]
    pub job: job::JobConfig,

    /// Event log output
    #[serde(default)]
    pub output: output::OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl JobloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.load.validate()?;
        self.polling.validate()?;
        self.retry.validate()?;
        self.job.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = JobloadConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JobloadConfig::default().validate_all().is_ok());
    }

    #[test]
    fn test_sample_parses_back() {
        let sample = JobloadConfig::generate_sample();
        assert!(sample.contains("base_url"));
        let parsed: JobloadConfig = serde_yaml::from_str(&sample).unwrap();
        assert_eq!(parsed.load.max_concurrent, 3);
        assert!(parsed.validate_all().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let parsed: JobloadConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(parsed.target.base_url, "http://localhost:8000");
        assert!(parsed.retry.retry_on_timeout);
    }
}
