//! Configuration loading and environment variable handling

use crate::domains::utils::secs_to_duration;
use crate::domains::JobloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the `JOBLOAD` prefix
    pub fn new() -> Self {
        Self {
            prefix: "JOBLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<JobloadConfig> {
        let config = self.read_file(path)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<JobloadConfig> {
        let config = self.read_env()?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<JobloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Parse a YAML file and apply environment overrides without validating.
    /// For callers that layer further overrides on top and validate the result.
    pub fn read_file(&self, path: impl AsRef<Path>) -> ConfigResult<JobloadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: JobloadConfig = serde_yaml::from_str(&content)?;
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Defaults plus environment overrides, not validated
    pub fn read_env(&self) -> ConfigResult<JobloadConfig> {
        let mut config = JobloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut JobloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_load_overrides(&mut config.load)?;
        self.apply_polling_overrides(&mut config.polling)?;
        self.apply_retry_overrides(&mut config.retry)?;
        self.apply_job_overrides(&mut config.job)?;
        self.apply_output_overrides(&mut config.output)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("TARGET_URL") {
            config.base_url = url;
        }
        if let Some(timeout) = self.parse_secs("HTTP_TIMEOUT")? {
            config.timeout = timeout;
        }
        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(verify) = self.parse_var("HTTP_VERIFY_SSL")? {
            config.verify_ssl = verify;
        }
        Ok(())
    }

    fn apply_load_overrides(
        &self,
        config: &mut crate::domains::load::LoadConfig,
    ) -> ConfigResult<()> {
        if let Some(users) = self.parse_var("USERS")? {
            config.users = users;
        }
        if let Some(rate) = self.parse_var("SPAWN_RATE")? {
            config.spawn_rate = rate;
        }
        if let Some(duration) = self.parse_secs("RUN_DURATION")? {
            config.run_duration = Some(duration);
        }
        if let Some(max) = self.parse_var("MAX_CONCURRENT")? {
            config.max_concurrent = max;
        }
        if let Some(think) = self.parse_secs("THINK_TIME")? {
            config.think_time = think;
        }
        Ok(())
    }

    fn apply_polling_overrides(
        &self,
        config: &mut crate::domains::polling::PollingConfig,
    ) -> ConfigResult<()> {
        if let Some(delay) = self.parse_secs("POLL_INITIAL_DELAY")? {
            config.initial_delay = delay;
        }
        if let Some(base) = self.parse_secs("POLL_BASE_INTERVAL")? {
            config.base_interval = base;
        }
        if let Some(max) = self.parse_secs("POLL_MAX_INTERVAL")? {
            config.max_interval = max;
        }
        if let Some(timeout) = self.parse_secs("METADATA_POLL_TIMEOUT")? {
            config.timeout = timeout;
        }
        Ok(())
    }

    fn apply_retry_overrides(
        &self,
        config: &mut crate::domains::retry::RetryConfig,
    ) -> ConfigResult<()> {
        if let Some(enabled) = self.parse_var("RETRY_ON_TIMEOUT")? {
            config.retry_on_timeout = enabled;
        }
        Ok(())
    }

    fn apply_job_overrides(&self, config: &mut crate::domains::job::JobConfig) -> ConfigResult<()> {
        if let Some(live) = self.parse_var("LIVE_MODE")? {
            config.live_mode = live;
        }
        if let Some(start) = self.parse_var("START_EPOCH")? {
            config.start_epoch = Some(start);
        }
        if let Some(end) = self.parse_var("END_EPOCH")? {
            config.end_epoch = Some(end);
        }
        Ok(())
    }

    fn apply_output_overrides(
        &self,
        config: &mut crate::domains::output::OutputConfig,
    ) -> ConfigResult<()> {
        if let Ok(dir) = self.get_env_var("OUTPUT_DIR") {
            config.directory = PathBuf::from(dir);
        }
        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }
        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }
        Ok(())
    }

    /// Parse a prefixed variable with `FromStr`, `None` when unset
    fn parse_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))),
            Err(_) => Ok(None),
        }
    }

    /// Parse a prefixed variable holding fractional seconds
    fn parse_secs(&self, name: &str) -> ConfigResult<Option<Duration>> {
        match self.parse_var::<f64>(name)? {
            Some(secs) => secs_to_duration(secs)
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))),
            None => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
