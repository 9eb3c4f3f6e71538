//! Dynamically sized pool of generation workers.
//!
//! This module defines the [`WorkerPool`] struct, which owns the set of running
//! [`worker_loop`] tasks and the sender half of the shared queue. The pool can
//! be resized at runtime through [`WorkerScaler::set_desired_size`] and shut
//! down with [`WorkerPool::quiesce`].
//!
//! Every worker holds a child of the pool's shutdown [`CancellationToken`], so
//! cancelling the parent stops them all while scale-down can stop individual
//! workers. Workers are spawned on a [`TaskTracker`], which lets shutdown wait
//! for every one of them, including workers already released by a scale-down,
//! before the queue closes.

use crate::pipeline::{error::Error, pool::worker::worker_loop, telemetry::Progress};
use keyforge::{GeneratedItem, KeyGenerator};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// Resizing interface the rate controller drives.
pub trait WorkerScaler: Send + Sync {
    /// Number of workers currently running (not yet asked to stop).
    fn active_count(&self) -> usize;

    /// Upper bound accepted by [`WorkerScaler::set_desired_size`].
    fn max_workers(&self) -> usize;

    /// Resizes the pool to `desired`, clamped to `[1, max_workers]`.
    ///
    /// Returns the size the pool now targets.
    fn set_desired_size(&self, desired: i64) -> usize;
}

struct WorkerHandle {
    id: usize,
    stop: CancellationToken,
}

struct PoolState {
    /// `None` once the pool has been quiesced; no worker is spawned after.
    queue: Option<mpsc::Sender<GeneratedItem>>,
    workers: Vec<WorkerHandle>,
    desired: usize,
    next_worker_id: usize,
}

/// A resizable pool of generation workers feeding one bounded queue.
///
/// All resizing goes through a single mutex-guarded [`PoolState`], so a
/// controller-driven resize and the shutdown shrink-to-zero cannot interleave.
pub struct WorkerPool<G> {
    generator: Arc<G>,
    state: Mutex<PoolState>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    progress: Arc<Progress>,
    fatal_tx: mpsc::UnboundedSender<Error>,
    max_workers: usize,
}

impl<G> WorkerPool<G>
where
    G: KeyGenerator,
{
    /// Constructs an empty pool. Call [`WorkerScaler::set_desired_size`] to
    /// start workers.
    ///
    /// Fatal worker errors are forwarded on `fatal_tx`.
    pub fn new(
        generator: Arc<G>,
        queue: mpsc::Sender<GeneratedItem>,
        shutdown: CancellationToken,
        progress: Arc<Progress>,
        fatal_tx: mpsc::UnboundedSender<Error>,
        max_workers: usize,
    ) -> Self {
        Self {
            generator,
            state: Mutex::new(PoolState {
                queue: Some(queue),
                workers: Vec::new(),
                desired: 0,
                next_worker_id: 0,
            }),
            tracker: TaskTracker::new(),
            shutdown,
            progress,
            fatal_tx,
            max_workers: max_workers.max(1),
        }
    }

    /// Size most recently requested (after clamping). Zero once quiesced.
    pub fn desired_size(&self) -> usize {
        self.state.lock().desired
    }

    /// Stops every worker and waits until all of them have exited.
    ///
    /// The pool drops its own queue sender first, so when this returns no
    /// sender remains and the aggregator observes the queue as closed once it
    /// has drained it. Calling this more than once is harmless.
    pub async fn quiesce(&self) {
        let stopped = {
            let mut state = self.state.lock();
            state.queue = None;
            state.desired = 0;
            core::mem::take(&mut state.workers)
        };

        tracing::debug!("Stopping {} workers", stopped.len());
        for handle in &stopped {
            handle.stop.cancel();
        }

        self.tracker.close();
        self.tracker.wait().await;

        tracing::info!("Worker pool quiesced");
    }

    fn spawn_worker(
        &self,
        worker_id: usize,
        queue: mpsc::Sender<GeneratedItem>,
        stop: CancellationToken,
    ) {
        let generator = Arc::clone(&self.generator);
        let progress = Arc::clone(&self.progress);
        let fatal_tx = self.fatal_tx.clone();

        self.tracker.spawn(async move {
            if let Err(e) = worker_loop(worker_id, generator, queue, stop, progress).await {
                tracing::error!("Worker {worker_id} failed: {e}");
                let _ = fatal_tx.send(e);
            }
        });
    }
}

impl<G> WorkerScaler for WorkerPool<G>
where
    G: KeyGenerator,
{
    fn active_count(&self) -> usize {
        self.state.lock().workers.len()
    }

    fn max_workers(&self) -> usize {
        self.max_workers
    }

    fn set_desired_size(&self, desired: i64) -> usize {
        let target = clamp_size(desired, self.max_workers);
        let mut state = self.state.lock();

        let Some(queue) = state.queue.clone() else {
            tracing::debug!("Ignoring resize to {target}: pool is shut down");
            return state.workers.len();
        };

        state.desired = target;
        let active = state.workers.len();

        if target > active {
            for _ in active..target {
                let id = state.next_worker_id;
                state.next_worker_id += 1;

                let stop = self.shutdown.child_token();
                self.spawn_worker(id, queue.clone(), stop.clone());
                state.workers.push(WorkerHandle { id, stop });
            }
        } else {
            for handle in state.workers.drain(target..) {
                tracing::trace!("Releasing worker {}", handle.id);
                handle.stop.cancel();
            }
        }

        if target != active {
            tracing::debug!("Worker pool resized from {active} to {target}");
        }
        target
    }
}

fn clamp_size(desired: i64, max_workers: usize) -> usize {
    usize::try_from(desired).unwrap_or(0).clamp(1, max_workers)
}
