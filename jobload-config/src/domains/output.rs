//! Event log output configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the lifecycle event log is written at run end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, created on demand
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// File name stem shared by the CSV and JSON sinks
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_stem: default_file_stem(),
        }
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(self.validation_error("directory cannot be empty"));
        }

        validate_required_string(&self.file_stem, "file_stem", self.domain_name())?;
        if self.file_stem.contains(['/', '\\']) {
            return Err(self.validation_error("file_stem must not contain path separators"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "output"
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("results")
}

fn default_file_stem() -> String {
    "job_events".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_defaults() {
        let config = OutputConfig::default();
        assert_eq!(config.directory, PathBuf::from("results"));
        assert_eq!(config.file_stem, "job_events");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_config_validation() {
        let mut config = OutputConfig::default();
        config.file_stem = "../escape".to_string();
        assert!(config.validate().is_err());

        config = OutputConfig::default();
        config.directory = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
