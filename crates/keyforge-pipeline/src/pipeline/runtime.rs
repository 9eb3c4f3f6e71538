//! Wires the pipeline together and runs it until shutdown.
//!
//! ```text
//! LoadSampler ─▶ RateController ─▶ WorkerPool (size)
//! workers ─▶ bounded queue ─▶ BatchAggregator ─▶ Store
//! ```
//!
//! [`Pipeline::run`] starts the pool at its initial size, the aggregator on a
//! blocking thread, and the rate controller. It then waits for the
//! termination signal, a fatal worker error, or an aggregator failure,
//! whichever comes first.

use crate::pipeline::{
    config::PipelineConfig,
    control::{controller::RateController, sampler::LoadSampler},
    error::Result,
    pool::manager::{WorkerPool, WorkerScaler},
    shutdown::{ShutdownCoordinator, ShutdownReason},
    sink::{aggregator::BatchAggregator, store::Store},
    telemetry::Progress,
};
use keyforge::KeyGenerator;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Totals reported after a graceful shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub produced: u64,
    pub saved: u64,
    pub flushes: u64,
}

pub struct Pipeline<G, S, L> {
    config: PipelineConfig,
    generator: Arc<G>,
    store: S,
    sampler: L,
}

impl<G, S, L> Pipeline<G, S, L>
where
    G: KeyGenerator,
    S: Store,
    L: LoadSampler,
{
    /// `store` must already have its schema in place.
    pub fn new(config: PipelineConfig, generator: G, store: S, sampler: L) -> Self {
        Self {
            config,
            generator: Arc::new(generator),
            store,
            sampler,
        }
    }

    /// Runs until `signal` completes, then drains and flushes everything
    /// buffered before returning.
    ///
    /// # Errors
    ///
    /// - A generator failure is returned as soon as it is observed, without
    ///   draining.
    /// - A store failure stops the workers and is returned once they have
    ///   exited.
    pub async fn run(self, signal: impl Future<Output = ()>) -> Result<PipelineReport> {
        let Self {
            config,
            generator,
            store,
            sampler,
        } = self;

        let progress = Arc::new(Progress::new());
        let coordinator = ShutdownCoordinator::new();
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();

        let mut aggregator = {
            let progress = Arc::clone(&progress);
            let threshold = config.batch_size;
            tokio::task::spawn_blocking(move || {
                BatchAggregator::new(store, threshold, progress).run(queue_rx)
            })
        };

        let pool = Arc::new(WorkerPool::new(
            generator,
            queue_tx,
            coordinator.token(),
            Arc::clone(&progress),
            fatal_tx,
            config.max_workers,
        ));
        let initial =
            pool.set_desired_size(i64::try_from(config.initial_workers).unwrap_or(i64::MAX));
        tracing::info!("Started {initial} generation workers");

        let controller = tokio::spawn(
            RateController::new(
                sampler,
                Arc::clone(&pool),
                config.control,
                Arc::clone(&progress),
            )
            .run(coordinator.token()),
        );

        tokio::pin!(signal);
        let finished_early = tokio::select! {
            () = &mut signal => None,
            Some(err) = fatal_rx.recv() => {
                coordinator.trigger(ShutdownReason::GeneratorFailure);
                return Err(err);
            }
            // Only a store failure ends the aggregator while the pool still
            // holds the queue open.
            joined = &mut aggregator => Some(joined),
        };

        let reason = if finished_early.is_some() {
            ShutdownReason::StoreFailure
        } else {
            ShutdownReason::Signal
        };
        coordinator.drain(pool.as_ref(), reason).await;

        let joined = match finished_early {
            Some(joined) => joined,
            None => aggregator.await,
        };
        let aggregated = joined??;

        if let Ok(err) = fatal_rx.try_recv() {
            return Err(err);
        }

        controller.await?;
        coordinator.finish();

        Ok(PipelineReport {
            produced: progress.produced(),
            saved: aggregated.saved,
            flushes: aggregated.flushes,
        })
    }
}
