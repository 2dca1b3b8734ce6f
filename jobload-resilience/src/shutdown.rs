//! Cooperative stop signalling
//!
//! A run has exactly one [`StopSignal`]. It is cleared when the run starts,
//! flipped once when the run stops, and polled by every loop that sleeps.
//! Sleeps are split into increments so that a stop request is observed
//! within one increment.

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Stand-in for "never" when a deadline would overflow the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `start + delay`, or roughly thirty years after `start` when the sum does
/// not fit in an [`Instant`]
pub fn deadline_after(start: Instant, delay: Duration) -> Instant {
    start
        .checked_add(delay)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

/// How a stop-aware sleep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration elapsed without a stop request
    Elapsed,
    /// A stop request was observed before the duration elapsed
    Stopped,
}

impl SleepOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, SleepOutcome::Stopped)
    }
}

/// Shared run-wide stop flag
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns `true` only for the call that flipped it.
    pub fn request_stop(&self) -> bool {
        let flipped = self
            .flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if flipped {
            info!("Stop requested");
        }
        flipped
    }

    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear the flag for a new run
    pub fn reset(&self) {
        if self.flag.swap(false, Ordering::AcqRel) {
            debug!("Stop flag cleared");
        }
    }

    /// Sleep for `total`, checking the flag before each `increment`-sized slice
    pub async fn sleep(&self, total: Duration, increment: Duration) -> SleepOutcome {
        self.sleep_until(deadline_after(Instant::now(), total), increment)
            .await
    }

    /// Sleep until `deadline`, checking the flag before each `increment`-sized slice
    pub async fn sleep_until(&self, deadline: Instant, increment: Duration) -> SleepOutcome {
        let increment = if increment.is_zero() {
            Duration::from_millis(1)
        } else {
            increment
        };

        loop {
            if self.is_stop_requested() {
                return SleepOutcome::Stopped;
            }
            let now = Instant::now();
            if now >= deadline {
                return SleepOutcome::Elapsed;
            }
            tokio::time::sleep((deadline - now).min(increment)).await;
        }
    }

    /// Resolve once the flag is set, checking every `increment`
    pub async fn stopped(&self, increment: Duration) {
        while self.sleep(increment, increment).await == SleepOutcome::Elapsed {}
    }
}
