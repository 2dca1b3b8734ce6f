//! Load run orchestration
//!
//! A [`LoadRunner`] wires the run's components from a [`JobloadConfig`],
//! ramps virtual users up at the configured spawn rate and keeps them
//! running until the run duration elapses, the caller's shutdown future
//! resolves, or someone flips the stop flag. The event log is flushed once,
//! after every user has returned.

use jobload_config::JobloadConfig;
use jobload_core::RunSummary;
use jobload_http::{HttpClient, HttpConfig, HttpManager};
use jobload_output::{EventRecorder, FlushReport, RecorderStats};
use jobload_resilience::{deadline_after, RetryPolicy};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::controller::RunController;
use crate::creator::JobCreator;
use crate::error::EngineResult;
use crate::gate::ConcurrencyGate;
use crate::metrics::{CounterSnapshot, RunCounters};
use crate::poller::{PollSchedule, PollingEngine};
use crate::user::{UserContext, VirtualUser};
use crate::window::WindowResolver;

/// What a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    /// `None` when the log had already been flushed
    #[serde(skip)]
    pub flush: Option<FlushReport>,
    pub elapsed: Duration,
    pub peak_in_flight: usize,
    pub counters: CounterSnapshot,
    /// Recorder activity, including the end-of-run flush
    pub recorder: RecorderStats,
    pub cycles: u64,
}

pub struct LoadRunner {
    config: JobloadConfig,
    controller: Arc<RunController>,
    ctx: UserContext,
}

impl LoadRunner {
    /// Validate `config` and build a runner that talks HTTP to its target
    pub fn from_config(config: JobloadConfig) -> EngineResult<Self> {
        config.validate_all()?;
        let client = HttpManager::with_config(HttpConfig::from(&config.target))?;
        Self::with_client(config, Arc::new(client))
    }

    /// Build a runner around an existing client
    pub fn with_client(config: JobloadConfig, client: Arc<dyn HttpClient>) -> EngineResult<Self> {
        let recorder =
            Arc::new(EventRecorder::new().with_file_stem(config.output.file_stem.clone()));
        let controller = Arc::new(RunController::new(
            recorder.clone(),
            config.output.directory.clone(),
        ));
        let stop = controller.stop_signal();

        let creator = JobCreator::new(
            client.clone(),
            ConcurrencyGate::new(config.load.max_concurrent),
            config.target.configure_path.clone(),
            config.job.payload.clone(),
        )
        .with_stop_signal(stop.clone(), config.polling.stop_check_interval);
        let poller = PollingEngine::new(
            client.clone(),
            config.target.metadata_path.clone(),
            PollSchedule::from(&config.polling),
            stop.clone(),
            recorder.clone(),
        );
        let windows = WindowResolver::from_config(client, &config.target, &config.job)?;

        let ctx = UserContext {
            creator: Arc::new(creator),
            poller: Arc::new(poller),
            windows: Arc::new(windows),
            recorder,
            stop,
            retry: RetryPolicy::immediate(config.retry.max_attempts()),
            think_time: config.load.think_time,
            stop_check_interval: config.polling.stop_check_interval,
            counters: Arc::new(RunCounters::new()),
        };

        Ok(Self {
            config,
            controller,
            ctx,
        })
    }

    pub fn controller(&self) -> &Arc<RunController> {
        &self.controller
    }

    pub fn config(&self) -> &JobloadConfig {
        &self.config
    }

    /// Run until the configured duration elapses or the stop flag is set
    pub async fn run(&self) -> EngineResult<RunReport> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Like [`run`](Self::run), also stopping when `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> EngineResult<RunReport>
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let load = &self.config.load;
        let step = self.config.polling.stop_check_interval;
        let stop = self.controller.stop_signal();

        self.controller.on_start().await;
        info!(
            users = load.users,
            spawn_rate = load.spawn_rate,
            max_concurrent = load.max_concurrent,
            duration_s = load.run_duration.map(|d| d.as_secs_f64()),
            "Starting load run"
        );

        let spawner = tokio::spawn(spawn_users(self.ctx.clone(), load.users, load.spawn_rate));

        let deadline = load.run_duration.map(|d| deadline_after(started, d));
        tokio::pin!(shutdown);
        tokio::select! {
            _ = sleep_until_deadline(deadline) => info!("Run duration elapsed"),
            _ = &mut shutdown => info!("Shutdown requested"),
            _ = stop.stopped(step) => info!("Stop flag set"),
        }
        self.controller.request_stop();

        let mut users = match spawner.await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "User spawner failed");
                JoinSet::new()
            }
        };

        let mut cycles = 0;
        while let Some(joined) = users.join_next().await {
            match joined {
                Ok(n) => cycles += n,
                Err(e) => warn!(error = %e, "Virtual user task failed"),
            }
        }
        debug!("All virtual users joined");

        let summary = RunSummary::from_events(&self.ctx.recorder.snapshot());
        let flush = self.controller.on_stop().await;

        let report = RunReport {
            summary,
            flush,
            elapsed: started.elapsed(),
            peak_in_flight: self.ctx.creator.gate().peak_in_flight(),
            counters: self.ctx.counters.snapshot(),
            recorder: self.ctx.recorder.metrics().snapshot(),
            cycles,
        };
        info!(
            summary = %report.summary,
            elapsed_s = report.elapsed.as_secs_f64(),
            peak_in_flight = report.peak_in_flight,
            "Load run finished"
        );
        Ok(report)
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Start `users` virtual users, `spawn_rate` per second, stopping early if
/// the run stops during ramp-up
async fn spawn_users(ctx: UserContext, users: usize, spawn_rate: f64) -> JoinSet<u64> {
    let gap = Duration::try_from_secs_f64(1.0 / spawn_rate).unwrap_or(Duration::ZERO);
    let mut set = JoinSet::new();

    for index in 0..users {
        if index > 0 && ctx.stop.sleep(gap, ctx.stop_check_interval).await.is_stopped() {
            break;
        }
        if ctx.stop.is_stop_requested() {
            break;
        }
        set.spawn(VirtualUser::new(format!("user-{}", index), ctx.clone()).run());
    }

    debug!(spawned = set.len(), "Ramp-up finished");
    set
}
