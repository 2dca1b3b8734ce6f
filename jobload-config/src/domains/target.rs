//! Target system (HTTP collaborator) configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_path, validate_positive_duration, validate_required_string, validate_url,
    Validatable,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the system under test lives and how to talk to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the system under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(with = "crate::domains::utils::serde_secs", default = "default_timeout")]
    pub timeout: Duration,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to verify TLS certificates
    #[serde(default = "crate::domains::utils::default_true")]
    pub verify_ssl: bool,

    /// Job creation endpoint
    #[serde(default = "default_configure_path")]
    pub configure_path: String,

    /// Job status endpoint prefix; the job id is appended as a path segment
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,

    /// Window discovery endpoint
    #[serde(default = "default_recordings_path")]
    pub recordings_path: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            verify_ssl: true,
            configure_path: default_configure_path(),
            metadata_path: default_metadata_path(),
            recordings_path: default_recordings_path(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_positive_duration(self.timeout, "timeout", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        validate_path(&self.configure_path, "configure_path", self.domain_name())?;
        validate_path(&self.metadata_path, "metadata_path", self.domain_name())?;
        validate_path(&self.recordings_path, "recordings_path", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("jobload/{}", env!("CARGO_PKG_VERSION"))
}

fn default_configure_path() -> String {
    "/configure".to_string()
}

fn default_metadata_path() -> String {
    "/metadata".to_string()
}

fn default_recordings_path() -> String {
    "/recordings_in_time_range".to_string()
}
