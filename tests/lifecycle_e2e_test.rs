//! End-to-end runs against a fake target over real HTTP

mod common;

use anyhow::Result;
use common::{fast_config, persisted_events, spawn_target, Readiness};
use jobload_core::{check_lifecycle_order, EventKind};
use jobload_engine::LoadRunner;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_live_run_persists_ordered_lifecycles() -> Result<()> {
    let (url, target) = spawn_target(Readiness::After(2), json!({"recordings": []})).await;
    let dir = TempDir::new()?;
    let config = fast_config(&url, &dir);

    let report = LoadRunner::from_config(config.clone())?.run().await?;

    assert_eq!(report.summary.users, 2);
    assert!(report.summary.completed > 0, "summary: {}", report.summary);
    assert_eq!(report.summary.timeouts, 0);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.created, target.jobs_created());
    assert!(report.peak_in_flight <= 2);

    let events = persisted_events(&config);
    assert!(check_lifecycle_order(&events).is_empty());
    assert!(events
        .iter()
        .filter(|e| e.event == EventKind::Completed)
        .all(|e| e.duration_ms.unwrap_or(0) >= 100));

    let csv = std::fs::read_to_string(config.output.directory.join("job_events.csv"))?;
    assert_eq!(
        csv.lines().next(),
        Some("time,event,job_id,attempt,user,start_epoch,end_epoch,duration_ms")
    );
    assert_eq!(csv.lines().count(), events.len() + 1);

    for body in target.configure_bodies() {
        assert!(body["start_time"].is_null());
        assert!(body["end_time"].is_null());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fixed_window_is_sent_with_every_job() -> Result<()> {
    let (url, target) = spawn_target(Readiness::After(0), json!({"recordings": []})).await;
    let dir = TempDir::new()?;
    let mut config = fast_config(&url, &dir);
    config.job.live_mode = false;
    config.job.start_epoch = Some(1_700_000_000);
    config.job.end_epoch = Some(1_700_000_300);
    config.job.payload.insert("camera".to_string(), json!("cam-7"));

    let report = LoadRunner::from_config(config.clone())?.run().await?;
    assert!(report.summary.created > 0);

    for body in target.configure_bodies() {
        assert_eq!(body["start_time"], 1_700_000_000);
        assert_eq!(body["end_time"], 1_700_000_300);
        assert_eq!(body["camera"], "cam-7");
    }
    let events = persisted_events(&config);
    assert!(events
        .iter()
        .all(|e| e.window.map(|w| (w.start, w.end)) == Some((1_700_000_000, 1_700_000_300))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_discovered_window_is_truncated() -> Result<()> {
    let recordings = json!({
        "recordings": [[1_000, 5_000], ["bad", 7], [900, 100], [2_000, 2_030]]
    });
    let (url, target) = spawn_target(Readiness::After(1), recordings).await;
    let dir = TempDir::new()?;
    let mut config = fast_config(&url, &dir);
    config.job.live_mode = false;
    config.job.window_length = Some(Duration::from_secs(60));

    let report = LoadRunner::from_config(config.clone())?.run().await?;
    assert!(report.summary.created > 0);
    assert_eq!(report.counters.window_failures, 0);

    for body in target.configure_bodies() {
        let start = body["start_time"].as_i64().unwrap();
        let end = body["end_time"].as_i64().unwrap();
        assert!(
            (start, end) == (1_000, 1_060) || (start, end) == (2_000, 2_030),
            "unexpected window [{}, {})",
            start,
            end
        );
    }
    Ok(())
}
