//! Fakes shared by the pipeline's unit tests.

use crate::pipeline::{
    control::sampler::{LoadSample, LoadSampler},
    error::{Error, Result},
    sink::store::Store,
};
use keyforge::{GeneratedItem, KeyGenerator};
use parking_lot::Mutex;
use portable_atomic::{AtomicU64, Ordering};
use std::{collections::VecDeque, sync::Arc};

/// Produces items whose secret encodes a global sequence number, so tests can
/// detect loss and duplication.
#[derive(Debug, Default)]
pub struct CountingGenerator {
    next: AtomicU64,
}

impl CountingGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    pub fn generated(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl KeyGenerator for CountingGenerator {
    fn try_generate(&self) -> keyforge::Result<GeneratedItem> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedItem::new(format!("{n:064x}"), format!("T{n}")))
    }
}

/// Succeeds `limit` times, then reports an entropy failure on every call.
#[derive(Debug)]
pub struct FailingGenerator {
    limit: u64,
    calls: AtomicU64,
}

impl FailingGenerator {
    pub const fn after(limit: u64) -> Self {
        Self {
            limit,
            calls: AtomicU64::new(0),
        }
    }
}

impl KeyGenerator for FailingGenerator {
    fn try_generate(&self) -> keyforge::Result<GeneratedItem> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.limit {
            return Err(keyforge::Error::Entropy {
                reason: "entropy pool exhausted".to_owned(),
            });
        }
        Ok(GeneratedItem::new(format!("{n:064x}"), format!("T{n}")))
    }
}

/// Everything a [`RecordingStore`] has been asked to persist.
#[derive(Debug, Default)]
pub struct Recorded {
    pub schema_calls: usize,
    pub batches: Vec<Vec<GeneratedItem>>,
}

impl Recorded {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(Vec::len).collect()
    }

    pub fn total_items(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// In-memory store whose contents stay observable after it has been moved
/// into the aggregator.
#[derive(Clone, Debug, Default)]
pub struct RecordingStore {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Arc<Mutex<Recorded>> {
        Arc::clone(&self.recorded)
    }
}

impl Store for RecordingStore {
    fn ensure_schema(&mut self) -> Result<()> {
        self.recorded.lock().schema_calls += 1;
        Ok(())
    }

    fn save_batch(&mut self, items: &[GeneratedItem]) -> Result<()> {
        self.recorded.lock().batches.push(items.to_vec());
        Ok(())
    }
}

/// Store that fails every `save_batch` call.
#[derive(Debug, Default)]
pub struct FailingStore;

impl Store for FailingStore {
    fn ensure_schema(&mut self) -> Result<()> {
        Ok(())
    }

    fn save_batch(&mut self, _items: &[GeneratedItem]) -> Result<()> {
        Err(Error::store("save batch")(rusqlite::Error::InvalidQuery))
    }
}

/// Replays a fixed sequence of utilization readings. `None` entries simulate a
/// failed read. Once exhausted, every sample fails.
#[derive(Debug)]
pub struct ScriptedSampler {
    readings: VecDeque<Option<f64>>,
}

impl ScriptedSampler {
    pub fn new(readings: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    pub fn constant(utilization: f64, ticks: usize) -> Self {
        Self::new(core::iter::repeat_n(Some(utilization), ticks))
    }
}

impl LoadSampler for ScriptedSampler {
    async fn sample(&mut self) -> Result<LoadSample> {
        match self.readings.pop_front().flatten() {
            Some(utilization) => Ok(LoadSample { utilization }),
            None => Err(Error::LoadSample {
                reason: "scripted failure".to_owned(),
            }),
        }
    }
}
