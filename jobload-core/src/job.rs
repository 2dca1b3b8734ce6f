//! Job handle and time window types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WindowError;

static JOB_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+-\d+$").expect("job id pattern is a valid regex"));

/// Server-assigned job identifier (opaque; see [`JobId::is_well_formed`])
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier matches the documented `<int>-<int>` shape.
    ///
    /// A mismatch is tolerated by callers; it only warrants a warning.
    pub fn is_well_formed(&self) -> bool {
        JOB_ID_PATTERN.is_match(&self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        JobId(id.to_string())
    }
}

/// A `[start, end)` range of epoch seconds used to parameterize a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build an optional window from independently supplied bounds.
    ///
    /// Both bounds absent means live mode (`Ok(None)`); exactly one present
    /// is rejected.
    pub fn from_bounds(
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Option<Self>, WindowError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(WindowError::HalfOpen),
        }
    }

    pub fn duration_secs(&self) -> i64 {
        self.end - self.start
    }

    /// Shorten the window so it spans at most `max_secs` from its start
    pub fn truncated(self, max_secs: i64) -> Self {
        if max_secs <= 0 || self.duration_secs() <= max_secs {
            return self;
        }
        Self {
            start: self.start,
            end: self.start + max_secs,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A job created on the target system.
///
/// Immutable once created and owned by the virtual user that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub window: Option<TimeWindow>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, window: Option<TimeWindow>) -> Self {
        Self {
            id,
            window,
            created_at: Utc::now(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.window.is_none()
    }
}
