//! # Telemetry
//!
//! Logging goes through `tracing` and is printed by a `tracing_subscriber`
//! fmt layer. Verbosity is controlled with `RUST_LOG` (default `info`).
//!
//! Pipeline progress is tracked by [`Progress`], a set of lock-free counters
//! shared by the workers, the aggregator, and the rate controller. The
//! controller reports them once per tick; they are for operators only and
//! no component makes decisions based on them.

use portable_atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}

/// Cumulative pipeline counters.
#[derive(Debug, Default)]
pub struct Progress {
    produced: AtomicU64,
    saved: AtomicU64,
    flushes: AtomicU64,
}

impl Progress {
    pub const fn new() -> Self {
        Self {
            produced: AtomicU64::new(0),
            saved: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    /// Records one item accepted by the queue.
    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one committed batch of `items` items.
    pub fn record_flush(&self, items: usize) {
        self.saved.fetch_add(items as u64, Ordering::Relaxed);
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    pub fn saved(&self) -> u64 {
        self.saved.load(Ordering::Relaxed)
    }

    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }
}
