//! Retry-on-timeout configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Upper bound on extra attempts after a timeout
pub const MAX_TIMEOUT_RETRIES: u32 = 5;

/// Whether a timed-out job cycle is re-run with a fresh job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    #[serde(default = "crate::domains::utils::default_true")]
    pub retry_on_timeout: bool,

    /// Extra attempts after the first; one retry means two attempts total
    #[serde(default = "default_max_timeout_retries")]
    pub max_timeout_retries: u32,
}

impl RetryConfig {
    /// Total create/poll attempts allowed per job cycle
    pub fn max_attempts(&self) -> u32 {
        if self.retry_on_timeout {
            1 + self.max_timeout_retries
        } else {
            1
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_on_timeout: true,
            max_timeout_retries: default_max_timeout_retries(),
        }
    }
}

impl Validatable for RetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_timeout_retries > MAX_TIMEOUT_RETRIES {
            return Err(self.validation_error(format!(
                "max_timeout_retries must be at most {}, got {}",
                MAX_TIMEOUT_RETRIES, self.max_timeout_retries
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "retry"
    }
}

fn default_max_timeout_retries() -> u32 {
    1
}
