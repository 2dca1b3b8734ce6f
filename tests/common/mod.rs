//! In-process fake target system served over real HTTP

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use jobload_config::JobloadConfig;
use jobload_core::JobEvent;
use jobload_output::JsonSink;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// How the fake answers status queries
#[derive(Debug, Clone, Copy)]
pub enum Readiness {
    /// 404 for the first `n` queries of each job, then 200
    After(u32),
    /// 404 forever
    Never,
    /// The given status for every query
    Always(u16),
}

pub struct FakeTarget {
    readiness: Readiness,
    next_id: AtomicU64,
    polls: Mutex<HashMap<String, u32>>,
    configure_bodies: Mutex<Vec<Value>>,
    recordings: Value,
}

impl FakeTarget {
    pub fn configure_bodies(&self) -> Vec<Value> {
        self.configure_bodies.lock().clone()
    }

    pub fn jobs_created(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

async fn configure(State(target): State<Arc<FakeTarget>>, Json(body): Json<Value>) -> Json<Value> {
    target.configure_bodies.lock().push(body);
    let n = target.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "job_id": format!("1700000000-{}", n),
        "stream_url": "rtsp://fake-target/stream",
        "stream_port": 8554,
    }))
}

async fn metadata(
    State(target): State<Arc<FakeTarget>>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let queries = {
        let mut polls = target.polls.lock();
        let count = polls.entry(job_id.clone()).or_insert(0);
        *count += 1;
        *count
    };

    match target.readiness {
        Readiness::After(n) if queries > n => Ok(Json(json!({"job_id": job_id, "frames": 42}))),
        Readiness::After(_) | Readiness::Never => Err(StatusCode::NOT_FOUND),
        Readiness::Always(status) => match StatusCode::from_u16(status) {
            Ok(code) if code.is_success() => Ok(Json(json!({"job_id": job_id}))),
            Ok(code) => Err(code),
            Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        },
    }
}

async fn recordings(State(target): State<Arc<FakeTarget>>) -> Json<Value> {
    Json(target.recordings.clone())
}

/// Serve a fake target on an ephemeral port; returns its base URL
pub async fn spawn_target(readiness: Readiness, recordings: Value) -> (String, Arc<FakeTarget>) {
    let target = Arc::new(FakeTarget {
        readiness,
        next_id: AtomicU64::new(0),
        polls: Mutex::new(HashMap::new()),
        configure_bodies: Mutex::new(Vec::new()),
        recordings,
    });

    let app = Router::new()
        .route("/configure", post(configure))
        .route("/metadata/{job_id}", get(metadata))
        .route("/recordings_in_time_range", post(self::recordings))
        .with_state(target.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), target)
}

/// A short, fast-polling live configuration writing into `dir`
pub fn fast_config(base_url: &str, dir: &TempDir) -> JobloadConfig {
    let _ = jobload_logging::init_simple_tracing("warn");

    let mut config = JobloadConfig::default();
    config.target.base_url = base_url.to_string();
    config.target.timeout = Duration::from_secs(2);
    config.load.users = 2;
    config.load.spawn_rate = 20.0;
    config.load.max_concurrent = 2;
    config.load.think_time = Duration::from_millis(100);
    config.load.run_duration = Some(Duration::from_secs(2));
    config.polling.initial_delay = Duration::from_millis(100);
    config.polling.base_interval = Duration::from_millis(50);
    config.polling.max_interval = Duration::from_millis(200);
    config.polling.timeout = Duration::from_secs(5);
    config.polling.stop_check_interval = Duration::from_millis(50);
    config.job.live_mode = true;
    config.output.directory = dir.path().join("results");
    config
}

/// Events persisted by a run's JSON sink
pub fn persisted_events(config: &JobloadConfig) -> Vec<JobEvent> {
    let path = config.output.directory.join("job_events.json");
    let data = std::fs::read(&path).unwrap();
    JsonSink::read_events(&data).unwrap()
}
