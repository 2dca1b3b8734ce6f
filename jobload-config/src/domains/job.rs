//! Job request configuration: window selection and configure payload

use crate::error::ConfigResult;
use crate::validation::{validate_positive_duration, Validatable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;

/// Payload keys owned by the engine; values supplied here are overwritten
pub const RESERVED_PAYLOAD_KEYS: [&str; 2] = ["start_time", "end_time"];

/// How each job request is parameterized
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Request live jobs (no time window)
    #[serde(default = "crate::domains::utils::default_false")]
    pub live_mode: bool,

    /// Fixed window start in epoch seconds; discovery is skipped when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_epoch: Option<i64>,

    /// Fixed window end in epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_epoch: Option<i64>,

    /// How far back window discovery searches for recordings
    #[serde(
        with = "crate::domains::utils::serde_secs",
        default = "default_discovery_lookback"
    )]
    pub discovery_lookback: Duration,

    /// Cap on the length of a discovered window
    #[serde(
        with = "crate::domains::utils::serde_secs_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub window_length: Option<Duration>,

    /// Extra configure parameters (display, channel, frequency, ...)
    #[serde(default)]
    pub payload: Map<String, JsonValue>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            live_mode: false,
            start_epoch: None,
            end_epoch: None,
            discovery_lookback: default_discovery_lookback(),
            window_length: None,
            payload: Map::new(),
        }
    }
}

impl JobConfig {
    /// Whether an explicit window was configured
    pub fn has_fixed_window(&self) -> bool {
        self.start_epoch.is_some() || self.end_epoch.is_some()
    }
}

impl Validatable for JobConfig {
    fn validate(&self) -> ConfigResult<()> {
        match (self.start_epoch, self.end_epoch) {
            (Some(start), Some(end)) if start >= end => {
                return Err(self.validation_error(format!(
                    "start_epoch ({}) must be before end_epoch ({})",
                    start, end
                )));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(
                    self.validation_error("start_epoch and end_epoch must be set together")
                );
            }
            _ => {}
        }

        if self.live_mode && self.has_fixed_window() {
            return Err(self.validation_error("live_mode cannot be combined with a fixed window"));
        }

        validate_positive_duration(
            self.discovery_lookback,
            "discovery_lookback",
            self.domain_name(),
        )?;

        if let Some(length) = self.window_length {
            validate_positive_duration(length, "window_length", self.domain_name())?;
        }

        for key in RESERVED_PAYLOAD_KEYS {
            if self.payload.contains_key(key) {
                log::warn!("job.payload.{} is set by the engine and will be ignored", key);
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "job"
    }
}

fn default_discovery_lookback() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}
