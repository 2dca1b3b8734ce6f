//! Gated job creation with strict response decoding

use jobload_core::{Job, JobError, JobId, TimeWindow};
use jobload_http::{HttpClient, HttpRequest, HttpResponse};
use jobload_resilience::StopSignal;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::gate::ConcurrencyGate;

/// Why a create call produced no job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    /// The run stopped before the configure request was sent
    #[error("run stopped before the job was created")]
    Stopped,

    #[error(transparent)]
    Job(#[from] JobError),
}

/// Body of a successful configure call. Only `job_id` is required; the
/// stream fields are informational.
#[derive(Debug, Deserialize)]
struct ConfigureResponse {
    job_id: String,
    #[serde(default)]
    stream_url: Option<JsonValue>,
    #[serde(default)]
    stream_port: Option<JsonValue>,
}

/// Issues configure requests through the gate and turns responses into jobs
pub struct JobCreator {
    client: Arc<dyn HttpClient>,
    gate: ConcurrencyGate,
    configure_path: String,
    payload: Map<String, JsonValue>,
    stop: StopSignal,
    stop_check_interval: Duration,
}

impl JobCreator {
    pub fn new(
        client: Arc<dyn HttpClient>,
        gate: ConcurrencyGate,
        configure_path: impl Into<String>,
        payload: Map<String, JsonValue>,
    ) -> Self {
        Self {
            client,
            gate,
            configure_path: configure_path.into(),
            payload,
            stop: StopSignal::new(),
            stop_check_interval: Duration::from_millis(100),
        }
    }

    /// Give up waiting at the gate once `stop` is set, checking every
    /// `increment`
    pub fn with_stop_signal(mut self, stop: StopSignal, increment: Duration) -> Self {
        self.stop = stop;
        self.stop_check_interval = increment;
        self
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Payload template with the window bounds, or nulls in live mode
    pub fn request_body(&self, window: Option<TimeWindow>) -> JsonValue {
        let mut body = self.payload.clone();
        body.insert(
            "start_time".to_string(),
            window.map_or(JsonValue::Null, |w| w.start.into()),
        );
        body.insert(
            "end_time".to_string(),
            window.map_or(JsonValue::Null, |w| w.end.into()),
        );
        JsonValue::Object(body)
    }

    /// Create one job. The gate permit is held only while the request is in
    /// flight. No retries happen here.
    ///
    /// A stop request abandons the wait for a permit, and no request is sent
    /// once the stop flag is set. A request already sent runs to completion.
    pub async fn create(&self, window: Option<TimeWindow>) -> Result<Job, CreateError> {
        let request = HttpRequest::post_json(self.configure_path.as_str(), self.request_body(window));

        let response = {
            let permit = tokio::select! {
                biased;
                permit = self.gate.acquire() => permit,
                _ = self.stop.stopped(self.stop_check_interval) => None,
            };
            let Some(_permit) = permit else {
                debug!("Stop requested while waiting for the gate");
                return Err(CreateError::Stopped);
            };
            if self.stop.is_stop_requested() {
                debug!("Stop requested, configure request not sent");
                return Err(CreateError::Stopped);
            }
            self.client.send(request).await
        };

        let response = response.map_err(|e| JobError::Transport(e.to_string()))?;
        let job = decode_job(&response, window)?;
        debug!(job_id = %job.id, window = ?job.window, "Job created");
        Ok(job)
    }
}

/// Validate a configure response and build the job it describes
pub fn decode_job(response: &HttpResponse, window: Option<TimeWindow>) -> Result<Job, JobError> {
    if response.status >= 400 {
        return Err(JobError::http(response.status, &response.body));
    }

    if !response.is_json() {
        return Err(JobError::MalformedResponse(format!(
            "expected JSON, got content type {}",
            response.content_type.as_deref().unwrap_or("<none>")
        )));
    }

    let value: JsonValue = response
        .decode()
        .map_err(|e| JobError::MalformedResponse(e.to_string()))?;
    if !value.is_object() {
        return Err(JobError::InvalidResponse(
            "expected a JSON object with a job_id".to_string(),
        ));
    }

    let decoded: ConfigureResponse = serde_json::from_value(value)
        .map_err(|e| JobError::InvalidResponse(format!("missing or invalid job_id: {}", e)))?;

    let id = JobId::new(decoded.job_id);
    if !id.is_well_formed() {
        warn!(job_id = %id, "Job id does not match the <int>-<int> format, accepting it");
    }

    let missing: Vec<&str> = [
        ("stream_url", &decoded.stream_url),
        ("stream_port", &decoded.stream_port),
    ]
    .iter()
    .filter(|(_, value)| value.as_ref().map_or(true, JsonValue::is_null))
    .map(|(name, _)| *name)
    .collect();
    if !missing.is_empty() {
        warn!(job_id = %id, missing = ?missing, "Incomplete job metadata");
    }

    Ok(Job::new(id, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobload_http::{HttpMethod, ScriptedClient, ScriptedResponse};
    use serde_json::json;
    use std::time::Duration;

    fn creator(client: &ScriptedClient, limit: usize) -> JobCreator {
        let mut payload = Map::new();
        payload.insert("display".to_string(), json!("wall-1"));
        JobCreator::new(
            Arc::new(client.clone()),
            ConcurrencyGate::new(limit),
            "/configure",
            payload,
        )
    }

    fn script(client: &ScriptedClient, responses: Vec<ScriptedResponse>) {
        client.script(HttpMethod::Post, "/configure", responses);
    }

    #[tokio::test]
    async fn test_create_success_sends_window() {
        let client = ScriptedClient::new();
        script(
            &client,
            vec![ScriptedResponse::json(
                200,
                json!({"job_id": "12-3", "stream_url": "rtsp://x", "stream_port": 8554}),
            )],
        );
        let window = TimeWindow::new(100, 160).unwrap();

        let job = creator(&client, 3).create(Some(window)).await.unwrap();
        assert_eq!(job.id.as_str(), "12-3");
        assert_eq!(job.window, Some(window));

        let body = client.requests()[0].body.clone().unwrap();
        assert_eq!(body["start_time"], 100);
        assert_eq!(body["end_time"], 160);
        assert_eq!(body["display"], "wall-1");
    }

    #[tokio::test]
    async fn test_live_mode_sends_nulls() {
        let client = ScriptedClient::new();
        script(&client, vec![ScriptedResponse::json(200, json!({"job_id": "1-1"}))]);

        let job = creator(&client, 1).create(None).await.unwrap();
        assert!(job.is_live());
        let body = client.requests()[0].body.clone().unwrap();
        assert!(body["start_time"].is_null());
        assert!(body["end_time"].is_null());
    }

    #[tokio::test]
    async fn test_unusual_job_id_is_accepted() {
        let client = ScriptedClient::new();
        script(&client, vec![ScriptedResponse::json(200, json!({"job_id": "job-abc"}))]);
        let job = creator(&client, 1).create(None).await.unwrap();
        assert_eq!(job.id.as_str(), "job-abc");
    }

    #[tokio::test]
    async fn test_missing_or_mistyped_job_id_is_invalid() {
        for body in [json!({"status": "ok"}), json!({"job_id": 17}), json!(["1-1"])] {
            let client = ScriptedClient::new();
            script(&client, vec![ScriptedResponse::json(200, body)]);
            let err = creator(&client, 1).create(None).await.unwrap_err();
            assert!(
                matches!(err, CreateError::Job(JobError::InvalidResponse(_))),
                "{:?}",
                err
            );
        }
    }

    #[tokio::test]
    async fn test_non_json_is_malformed() {
        let client = ScriptedClient::new();
        script(&client, vec![ScriptedResponse::text(200, "text/html", "<h1>ok</h1>")]);
        let err = creator(&client, 1).create(None).await.unwrap_err();
        assert!(matches!(err, CreateError::Job(JobError::MalformedResponse(_))));

        let client = ScriptedClient::new();
        script(&client, vec![ScriptedResponse::text(200, "application/json", "{not json")]);
        let err = creator(&client, 1).create(None).await.unwrap_err();
        assert!(matches!(err, CreateError::Job(JobError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_error_status_carries_truncated_body() {
        let client = ScriptedClient::new();
        let body = "x".repeat(500);
        script(&client, vec![ScriptedResponse::text(503, "text/plain", &body)]);

        let err = creator(&client, 1).create(None).await.unwrap_err();
        match err {
            CreateError::Job(JobError::HttpError { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body.chars().count(), 203);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_releases_permit() {
        let client = ScriptedClient::new();
        script(&client, vec![ScriptedResponse::transport_error("connection refused")]);
        let creator = creator(&client, 1);

        let err = creator.create(None).await.unwrap_err();
        assert!(matches!(err, CreateError::Job(JobError::Transport(_))));
        assert_eq!(creator.gate().in_flight(), 0);
        assert_eq!(creator.gate().available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_permit_serializes_requests() {
        let client = ScriptedClient::new();
        script(
            &client,
            vec![ScriptedResponse::json(200, json!({"job_id": "1-1"}))
                .delayed(Duration::from_millis(300))],
        );
        let creator = creator(&client, 1);

        let (a, b) = tokio::join!(creator.create(None), creator.create(None));
        assert!(a.is_ok() && b.is_ok());

        let mut requests = client.requests();
        requests.sort_by_key(|r| r.started);
        assert_eq!(requests.len(), 2);
        assert!(requests[1].started >= requests[0].finished);
        assert_eq!(creator.gate().peak_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_callers_queued_at_the_gate() {
        let client = ScriptedClient::new();
        script(
            &client,
            vec![ScriptedResponse::json(200, json!({"job_id": "1-1"}))
                .delayed(Duration::from_secs(5))],
        );
        let stop = StopSignal::new();
        let creator = Arc::new(
            creator(&client, 1).with_stop_signal(stop.clone(), Duration::from_millis(100)),
        );

        let mut handles = Vec::new();
        for _ in 0..3 {
            let creator = creator.clone();
            handles.push(tokio::spawn(async move { creator.create(None).await }));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        let stopped_at = tokio::time::Instant::now();
        stop.request_stop();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(CreateError::Stopped)))
                .count(),
            2
        );
        let requests = client.requests_to("/configure");
        assert_eq!(requests.len(), 1);
        assert!(requests.iter().all(|r| r.started < stopped_at));
        assert_eq!(creator.gate().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_nothing_is_sent_once_stopped() {
        let client = ScriptedClient::new();
        script(&client, vec![ScriptedResponse::json(200, json!({"job_id": "1-1"}))]);
        let stop = StopSignal::new();
        stop.request_stop();
        let creator = creator(&client, 1).with_stop_signal(stop, Duration::from_millis(100));

        assert_eq!(creator.create(None).await.unwrap_err(), CreateError::Stopped);
        assert!(client.requests().is_empty());
        assert_eq!(creator.gate().available(), 1);
    }
}
