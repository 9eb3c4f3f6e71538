//! Feedback loop that steers the worker count toward a CPU set point.
//!
//! Each tick runs **sample → compare → adjust** and then waits for the next
//! interval. Utilization below `target - band` adds one worker; above
//! `target + band` removes one; anything inside the band (inclusive) holds.
//! The step is always a single worker, which bounds oscillation from one noisy
//! sample.
//!
//! The first tick happens one full interval after start, so the pool runs at
//! its initial size until then.

use crate::pipeline::{
    config::ControlSettings,
    control::sampler::LoadSampler,
    pool::manager::WorkerScaler,
    telemetry::Progress,
};
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Outcome of comparing one sample with the set point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Grow,
    Shrink,
    Hold,
}

impl Adjustment {
    pub const fn delta(self) -> i64 {
        match self {
            Self::Grow => 1,
            Self::Shrink => -1,
            Self::Hold => 0,
        }
    }
}

/// Decides how the pool should move for a given utilization reading.
pub fn decide(
    utilization: f64,
    active: usize,
    max_workers: usize,
    settings: &ControlSettings,
) -> Adjustment {
    let low = settings.target_load - settings.load_band;
    let high = settings.target_load + settings.load_band;

    if utilization < low && active < max_workers {
        Adjustment::Grow
    } else if utilization > high && active > 1 {
        Adjustment::Shrink
    } else {
        Adjustment::Hold
    }
}

/// What a completed tick observed and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub utilization: f64,
    pub adjustment: Adjustment,
    pub active_workers: usize,
    pub total_produced: u64,
}

pub struct RateController<L, P: ?Sized> {
    sampler: L,
    pool: Arc<P>,
    settings: ControlSettings,
    progress: Arc<Progress>,
}

impl<L, P> RateController<L, P>
where
    L: LoadSampler,
    P: WorkerScaler + ?Sized,
{
    pub const fn new(
        sampler: L,
        pool: Arc<P>,
        settings: ControlSettings,
        progress: Arc<Progress>,
    ) -> Self {
        Self {
            sampler,
            pool,
            settings,
            progress,
        }
    }

    /// Runs one sample/compare/adjust cycle.
    ///
    /// Returns `None` without touching the pool if the sample failed.
    pub async fn tick(&mut self) -> Option<TickReport> {
        let sample = match self.sampler.sample().await {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!("Skipping control tick: {e}");
                return None;
            }
        };

        let active = self.pool.active_count();
        let adjustment = decide(
            sample.utilization,
            active,
            self.pool.max_workers(),
            &self.settings,
        );

        let active_workers = match adjustment {
            Adjustment::Hold => active,
            _ => {
                let current = i64::try_from(active).unwrap_or(i64::MAX);
                self.pool.set_desired_size(current + adjustment.delta())
            }
        };

        let report = TickReport {
            utilization: sample.utilization,
            adjustment,
            active_workers,
            total_produced: self.progress.produced(),
        };

        let utilization = format!("{:.2}%", report.utilization);
        tracing::info!(
            utilization = %utilization,
            active_workers = report.active_workers,
            total_produced = report.total_produced,
            "Load status"
        );

        Some(report)
    }

    /// Ticks every configured interval until `stop` is cancelled.
    ///
    /// Cancellation during a sample abandons that tick before any adjustment.
    pub async fn run(mut self, stop: CancellationToken) {
        let period = self.settings.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = stop.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                () = stop.cancelled() => break,
                _ = self.tick() => {}
            }
        }

        tracing::debug!("Rate controller stopped");
    }
}
