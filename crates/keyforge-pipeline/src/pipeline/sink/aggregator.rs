//! Single consumer that batches queued items into the store.
//!
//! The aggregator drains the queue until it is closed and empty, flushing a
//! full batch each time the threshold is reached and the remainder once the
//! queue closes. A store failure is returned immediately; the caller treats it
//! as fatal.

use crate::pipeline::{error::Result, sink::store::Store, telemetry::Progress};
use keyforge::GeneratedItem;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Totals for one aggregator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorReport {
    pub flushes: u64,
    pub saved: u64,
}

pub struct BatchAggregator<S> {
    store: S,
    batch: Vec<GeneratedItem>,
    threshold: usize,
    progress: Arc<Progress>,
    report: AggregatorReport,
}

impl<S> BatchAggregator<S>
where
    S: Store,
{
    /// A `threshold` of zero is treated as one.
    pub fn new(store: S, threshold: usize, progress: Arc<Progress>) -> Self {
        let threshold = threshold.max(1);
        Self {
            store,
            batch: Vec::with_capacity(threshold),
            threshold,
            progress,
            report: AggregatorReport::default(),
        }
    }

    /// Appends `item`, flushing if the batch reaches the threshold.
    ///
    /// # Errors
    ///
    /// Propagates the store error if a flush fails.
    pub fn push(&mut self, item: GeneratedItem) -> Result<()> {
        self.batch.push(item);
        if self.batch.len() >= self.threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Commits the pending batch. Does nothing if it is empty.
    ///
    /// # Errors
    ///
    /// Propagates the store error. The batch is left untouched.
    pub fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let len = self.batch.len();
        self.store.save_batch(&self.batch)?;
        self.batch.clear();

        self.progress.record_flush(len);
        self.report.flushes += 1;
        self.report.saved += len as u64;
        tracing::debug!("Flushed batch of {len}");
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Drains `queue` to completion, then flushes whatever remains.
    ///
    /// Must run on a blocking thread (e.g. inside
    /// [`tokio::task::spawn_blocking`]).
    ///
    /// # Errors
    ///
    /// Returns the first store error. The queue receiver is dropped with it,
    /// which ends any worker still trying to submit.
    pub fn run(mut self, mut queue: mpsc::Receiver<GeneratedItem>) -> Result<AggregatorReport> {
        while let Some(item) = queue.blocking_recv() {
            self.push(item)?;
        }

        self.flush()?;

        tracing::info!(
            "Aggregator drained: {} items saved in {} flushes",
            self.report.saved,
            self.report.flushes
        );
        Ok(self.report)
    }
}
