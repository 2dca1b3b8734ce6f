//! Load shape configuration: virtual users and admission control

use crate::error::ConfigResult;
use crate::validation::{
    validate_duration, validate_positive, validate_positive_duration, Validatable,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many virtual users run, how fast they start, and how many job
/// creations may be in flight at once
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of concurrent virtual users
    #[serde(default = "default_users")]
    pub users: usize,

    /// Users started per second during ramp-up
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,

    /// Total run duration; `None` runs until interrupted
    #[serde(
        with = "crate::domains::utils::serde_secs_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_duration: Option<Duration>,

    /// Maximum simultaneous job-creation calls across all users
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Pause between a user's job cycles
    #[serde(with = "crate::domains::utils::serde_secs", default = "default_think_time")]
    pub think_time: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            spawn_rate: default_spawn_rate(),
            run_duration: None,
            max_concurrent: default_max_concurrent(),
            think_time: default_think_time(),
        }
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.users, "users", self.domain_name())?;
        validate_positive(self.spawn_rate, "spawn_rate", self.domain_name())?;
        validate_positive(self.max_concurrent, "max_concurrent", self.domain_name())?;

        validate_duration(self.think_time, "think_time", self.domain_name())?;
        if let Some(duration) = self.run_duration {
            validate_positive_duration(duration, "run_duration", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

// Default value functions
fn default_users() -> usize {
    10
}

fn default_spawn_rate() -> f64 {
    1.0
}

fn default_max_concurrent() -> usize {
    3
}

fn default_think_time() -> Duration {
    Duration::from_secs(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_defaults() {
        let config = LoadConfig::default();
        assert_eq!(config.users, 10);
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.run_duration, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_validation() {
        let mut config = LoadConfig::default();
        config.max_concurrent = 0;
        assert!(config.validate().is_err());

        config = LoadConfig::default();
        config.spawn_rate = 0.0;
        assert!(config.validate().is_err());

        config = LoadConfig::default();
        config.run_duration = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config = LoadConfig::default();
        config.run_duration = Some(Duration::from_secs(u64::MAX / 2));
        assert!(config.validate().is_err());

        config = LoadConfig::default();
        config.think_time = Duration::from_secs(u64::MAX / 2);
        assert!(config.validate().is_err());
    }
}
