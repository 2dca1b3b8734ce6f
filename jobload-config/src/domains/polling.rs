//! Job status polling configuration

use crate::error::ConfigResult;
use crate::validation::{validate_duration, validate_positive_duration, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on how long a sleeping loop may go without checking the
/// stop signal
pub const MAX_STOP_CHECK_INTERVAL: Duration = Duration::from_millis(200);

/// Timing of the metadata polling loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Grace period between job creation and the first status query
    #[serde(with = "crate::domains::utils::serde_secs", default = "default_initial_delay")]
    pub initial_delay: Duration,

    /// First backoff interval
    #[serde(with = "crate::domains::utils::serde_secs", default = "default_base_interval")]
    pub base_interval: Duration,

    /// Backoff cap
    #[serde(with = "crate::domains::utils::serde_secs", default = "default_max_interval")]
    pub max_interval: Duration,

    /// Deadline for a single polling attempt (`metadata_poll_timeout`)
    #[serde(
        with = "crate::domains::utils::serde_secs",
        default = "default_timeout",
        alias = "metadata_poll_timeout"
    )]
    pub timeout: Duration,

    /// Granularity at which sleeps observe the stop signal
    #[serde(
        with = "crate::domains::utils::serde_secs",
        default = "default_stop_check_interval"
    )]
    pub stop_check_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            base_interval: default_base_interval(),
            max_interval: default_max_interval(),
            timeout: default_timeout(),
            stop_check_interval: default_stop_check_interval(),
        }
    }
}

impl Validatable for PollingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_duration(self.initial_delay, "initial_delay", self.domain_name())?;
        validate_positive_duration(self.base_interval, "base_interval", self.domain_name())?;
        validate_positive_duration(self.max_interval, "max_interval", self.domain_name())?;
        validate_positive_duration(self.timeout, "timeout", self.domain_name())?;
        validate_positive_duration(
            self.stop_check_interval,
            "stop_check_interval",
            self.domain_name(),
        )?;

        if self.base_interval > self.max_interval {
            return Err(self.validation_error(format!(
                "base_interval ({:?}) must not exceed max_interval ({:?})",
                self.base_interval, self.max_interval
            )));
        }

        if self.stop_check_interval > MAX_STOP_CHECK_INTERVAL {
            return Err(self.validation_error(format!(
                "stop_check_interval must be at most {:?}, got {:?}",
                MAX_STOP_CHECK_INTERVAL, self.stop_check_interval
            )));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "polling"
    }
}

// Default value functions
fn default_initial_delay() -> Duration {
    Duration::from_millis(1500)
}

fn default_base_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_max_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_stop_check_interval() -> Duration {
    Duration::from_millis(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_config_defaults() {
        let config = PollingConfig::default();
        assert_eq!(config.initial_delay, Duration::from_millis(1500));
        assert_eq!(config.base_interval, Duration::from_millis(200));
        assert_eq!(config.max_interval, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.stop_check_interval, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_polling_config_validation() {
        let mut config = PollingConfig::default();
        config.base_interval = Duration::from_secs(5);
        assert!(config.validate().is_err());

        config = PollingConfig::default();
        config.stop_check_interval = Duration::from_millis(500);
        assert!(config.validate().is_err());

        config = PollingConfig::default();
        config.initial_delay = Duration::ZERO;
        assert!(config.validate().is_ok());

        config = PollingConfig::default();
        config.timeout = Duration::from_secs(u64::MAX / 2);
        assert!(config.validate().is_err());

        config = PollingConfig::default();
        config.initial_delay = Duration::from_secs(u64::MAX / 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metadata_poll_timeout_alias() {
        let config: PollingConfig = serde_yaml::from_str("metadata_poll_timeout: 30").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
