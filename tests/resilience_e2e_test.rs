//! Timeouts, rejections and an unreachable target

mod common;

use anyhow::Result;
use common::{fast_config, persisted_events, spawn_target, Readiness};
use jobload_core::{check_lifecycle_order, EventKind};
use jobload_engine::LoadRunner;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timeouts_are_retried_with_fresh_jobs() -> Result<()> {
    let (url, _target) = spawn_target(Readiness::Never, json!({"recordings": []})).await;
    let dir = TempDir::new()?;
    let mut config = fast_config(&url, &dir);
    config.load.users = 1;
    config.polling.timeout = Duration::from_millis(300);
    config.retry.retry_on_timeout = true;
    config.retry.max_timeout_retries = 1;

    let report = LoadRunner::from_config(config.clone())?.run().await?;
    assert_eq!(report.summary.completed, 0);
    assert!(report.summary.timeouts >= 2, "summary: {}", report.summary);
    assert!(report.summary.retried >= 1);
    assert!(report.counters.timeout_retries >= 1);

    let events = persisted_events(&config);
    assert!(check_lifecycle_order(&events).is_empty());

    // Every retry follows a timeout of the previous attempt
    for (i, event) in events.iter().enumerate() {
        if event.event == EventKind::Created && event.attempt == 2 {
            assert_eq!(events[i - 1].event, EventKind::Timeout);
            assert_eq!(events[i - 1].attempt, 1);
        }
        assert!(event.attempt <= 2);
    }

    for timeout in events.iter().filter(|e| e.event == EventKind::Timeout) {
        let elapsed = timeout.duration_ms.unwrap();
        // initial delay + deadline, at most one backoff interval late
        assert!((400..=900).contains(&elapsed), "timeout after {}ms", elapsed);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disabled_retry_runs_single_attempts() -> Result<()> {
    let (url, _target) = spawn_target(Readiness::Never, json!({"recordings": []})).await;
    let dir = TempDir::new()?;
    let mut config = fast_config(&url, &dir);
    config.load.users = 1;
    config.polling.timeout = Duration::from_millis(300);
    config.retry.retry_on_timeout = false;

    let report = LoadRunner::from_config(config.clone())?.run().await?;
    assert_eq!(report.summary.retried, 0);
    assert!(persisted_events(&config).iter().all(|e| e.attempt == 1));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_permanent_rejection_records_failed() -> Result<()> {
    let (url, _target) = spawn_target(Readiness::Always(403), json!({"recordings": []})).await;
    let dir = TempDir::new()?;
    let config = fast_config(&url, &dir);

    let report = LoadRunner::from_config(config.clone())?.run().await?;
    assert!(report.summary.failed > 0);
    assert_eq!(report.summary.completed, 0);
    assert_eq!(report.summary.retried, 0);

    let events = persisted_events(&config);
    assert!(check_lifecycle_order(&events).is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unreachable_target_still_writes_logs() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = fast_config("http://127.0.0.1:9", &dir);
    config.load.run_duration = Some(Duration::from_secs(1));

    let report = LoadRunner::from_config(config.clone())?.run().await?;
    assert_eq!(report.summary.created, 0);
    assert!(report.counters.create_failures > 0);

    let flush = report.flush.expect("first stop flushes");
    assert!(flush.is_complete());
    assert!(persisted_events(&config).is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_request_ends_run_promptly() -> Result<()> {
    let (url, _target) = spawn_target(Readiness::Never, json!({"recordings": []})).await;
    let dir = TempDir::new()?;
    let mut config = fast_config(&url, &dir);
    config.load.run_duration = None;

    let runner = LoadRunner::from_config(config)?;
    let controller = runner.controller().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(700)).await;
        controller.request_stop();
    });

    let started = std::time::Instant::now();
    let report = runner.run().await?;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.summary.timeouts, 0);
    assert!(report.summary.abandoned > 0);
    Ok(())
}
