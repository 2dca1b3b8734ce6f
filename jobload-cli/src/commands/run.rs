//! `jobload run`

use anyhow::{Context, Result};
use jobload_config::JobloadConfig;
use jobload_engine::{LoadRunner, RunReport};
use tracing::{info, warn};

use crate::cli::RunArgs;

/// Apply command-line overrides on top of file and environment settings
pub fn apply_overrides(config: &mut JobloadConfig, args: &RunArgs) {
    if let Some(target) = &args.target {
        config.target.base_url = target.clone();
    }
    if let Some(users) = args.users {
        config.load.users = users;
    }
    if let Some(rate) = args.spawn_rate {
        config.load.spawn_rate = rate;
    }
    if let Some(duration) = args.duration {
        config.load.run_duration = Some(duration);
    }
    if let Some(max) = args.max_concurrent {
        config.load.max_concurrent = max;
    }
    if args.live {
        config.job.live_mode = true;
        config.job.start_epoch = None;
        config.job.end_epoch = None;
    }
    if args.start.is_some() || args.end.is_some() {
        config.job.live_mode = false;
        config.job.start_epoch = args.start;
        config.job.end_epoch = args.end;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
}

/// Resolve when Ctrl-C is pressed. If the handler cannot be installed the
/// run is bounded only by its duration.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, stopping run"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await
        }
    }
}

pub async fn handle_run(mut config: JobloadConfig, args: &RunArgs) -> Result<()> {
    apply_overrides(&mut config, args);
    config
        .validate_all()
        .context("Invalid configuration after command-line overrides")?;

    if config.load.run_duration.is_none() {
        info!("No run duration configured; press Ctrl-C to stop");
    }

    let runner = LoadRunner::from_config(config).context("Failed to set up load run")?;
    let report = runner
        .run_until(ctrl_c())
        .await
        .context("Load run failed")?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Run finished in {:.1}s", report.elapsed.as_secs_f64());
    println!("  {}", report.summary);
    println!(
        "  cycles={} create_failures={} window_failures={} timeout_retries={} peak_in_flight={}",
        report.cycles,
        report.counters.create_failures,
        report.counters.window_failures,
        report.counters.timeout_retries,
        report.peak_in_flight
    );
    println!(
        "  events_recorded={} files_written={} bytes_written={} failed_writes={}",
        report.recorder.events_appended,
        report.recorder.files_written,
        report.recorder.bytes_written,
        report.recorder.failed_writes
    );

    if let Some(flush) = &report.flush {
        for path in &flush.written {
            println!("  wrote {}", path.display());
        }
        for failure in &flush.failures {
            println!("  ❌ {} not written: {}", failure.sink, failure.error);
        }
    }
}
