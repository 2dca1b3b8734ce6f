//! Time window selection for job requests

use chrono::Utc;
use jobload_config::{JobConfig, TargetConfig};
use jobload_core::{JobError, TimeWindow};
use jobload_http::{HttpClient, HttpRequest};
use rand::seq::IndexedRandom;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::EngineResult;

/// Where job windows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSource {
    /// Live jobs carry no window
    Live,
    /// An operator-supplied window used as is
    Fixed(TimeWindow),
    /// Ask the target for recordings in the trailing `lookback` and pick one
    Discover {
        lookback: Duration,
        window_length: Option<Duration>,
    },
}

impl WindowSource {
    pub fn from_config(config: &JobConfig) -> EngineResult<Self> {
        if config.live_mode {
            return Ok(WindowSource::Live);
        }
        match TimeWindow::from_bounds(config.start_epoch, config.end_epoch)? {
            Some(window) => Ok(WindowSource::Fixed(window)),
            None => Ok(WindowSource::Discover {
                lookback: config.discovery_lookback,
                window_length: config.window_length,
            }),
        }
    }
}

/// Resolves the window a virtual user parameterizes its jobs with
pub struct WindowResolver {
    client: Arc<dyn HttpClient>,
    recordings_path: String,
    source: WindowSource,
}

impl WindowResolver {
    pub fn new(
        client: Arc<dyn HttpClient>,
        recordings_path: impl Into<String>,
        source: WindowSource,
    ) -> Self {
        Self {
            client,
            recordings_path: recordings_path.into(),
            source,
        }
    }

    pub fn from_config(
        client: Arc<dyn HttpClient>,
        target: &TargetConfig,
        job: &JobConfig,
    ) -> EngineResult<Self> {
        Ok(Self::new(
            client,
            target.recordings_path.clone(),
            WindowSource::from_config(job)?,
        ))
    }

    pub fn source(&self) -> &WindowSource {
        &self.source
    }

    /// `Ok(None)` means live mode
    pub async fn resolve(&self) -> Result<Option<TimeWindow>, JobError> {
        match &self.source {
            WindowSource::Live => Ok(None),
            WindowSource::Fixed(window) => Ok(Some(*window)),
            WindowSource::Discover {
                lookback,
                window_length,
            } => self.discover(*lookback, *window_length).await.map(Some),
        }
    }

    async fn discover(
        &self,
        lookback: Duration,
        window_length: Option<Duration>,
    ) -> Result<TimeWindow, JobError> {
        let now = Utc::now().timestamp();
        let lookback = i64::try_from(lookback.as_secs()).unwrap_or(i64::MAX);
        let body = json!({
            "start_time": now.saturating_sub(lookback),
            "end_time": now,
        });

        let response = self
            .client
            .send(HttpRequest::post_json(self.recordings_path.as_str(), body))
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;

        if response.status >= 400 {
            return Err(JobError::http(response.status, &response.body));
        }
        if !response.is_json() {
            return Err(JobError::MalformedResponse(
                "recordings response is not JSON".to_string(),
            ));
        }
        let value: JsonValue = response
            .decode()
            .map_err(|e| JobError::MalformedResponse(e.to_string()))?;

        let candidates = parse_recordings(&value)?;
        debug!("Discovered {} usable recordings", candidates.len());

        let window = pick_recording(&candidates).ok_or(JobError::NoRecordings)?;
        let window = match window_length {
            Some(length) => {
                window.truncated(i64::try_from(length.as_secs()).unwrap_or(i64::MAX))
            }
            None => window,
        };
        info!("Using recording window {}", window);
        Ok(window)
    }
}

/// Extract valid `[start, end]` pairs, skipping malformed entries
pub fn parse_recordings(value: &JsonValue) -> Result<Vec<TimeWindow>, JobError> {
    let entries = value
        .get("recordings")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| {
            JobError::InvalidResponse("expected an object with a recordings array".to_string())
        })?;

    let windows: Vec<TimeWindow> = entries
        .iter()
        .filter_map(|entry| {
            let pair = entry.as_array()?;
            if pair.len() != 2 {
                return None;
            }
            let start = pair[0].as_i64()?;
            let end = pair[1].as_i64()?;
            TimeWindow::new(start, end).ok()
        })
        .collect();

    if windows.len() < entries.len() {
        debug!(
            "Skipped {} malformed recording entries",
            entries.len() - windows.len()
        );
    }
    Ok(windows)
}

fn pick_recording(candidates: &[TimeWindow]) -> Option<TimeWindow> {
    candidates.choose(&mut rand::rng()).copied()
}
