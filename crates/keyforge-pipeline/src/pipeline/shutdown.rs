//! Graceful, lossless shutdown.
//!
//! [`ShutdownCoordinator`] moves through **Running → Draining → Stopped**.
//! Triggering it cancels the shared [`CancellationToken`], which every worker
//! and the rate controller observe. Draining then waits for the worker pool to
//! quiesce; only when the last worker has exited does the queue close, so no
//! worker ever submits into a closed queue. The pipeline marks the coordinator
//! stopped once the aggregator has flushed its final batch.

use crate::pipeline::pool::manager::WorkerPool;
use keyforge::KeyGenerator;
use portable_atomic::{AtomicU8, Ordering};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl Phase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// What started the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownReason {
    /// Ctrl+C or SIGTERM.
    Signal = 1,
    /// A worker's generator failed.
    GeneratorFailure = 2,
    /// The aggregator could not persist a batch.
    StoreFailure = 3,
}

impl ShutdownReason {
    const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Signal),
            2 => Some(Self::GeneratorFailure),
            3 => Some(Self::StoreFailure),
            _ => None,
        }
    }
}

impl core::fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Signal => "termination signal",
            Self::GeneratorFailure => "generator failure",
            Self::StoreFailure => "store failure",
        })
    }
}

#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    phase: AtomicU8,
    // 0 until the first trigger.
    reason: AtomicU8,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            phase: AtomicU8::new(Phase::Running as u8),
            reason: AtomicU8::new(0),
        }
    }

    /// Token cancelled when shutdown begins.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason passed to the first [`trigger`](Self::trigger), if any.
    pub fn reason(&self) -> Option<ShutdownReason> {
        ShutdownReason::from_u8(self.reason.load(Ordering::Acquire))
    }

    /// Starts shutdown for `reason`.
    ///
    /// Returns `true` only for the call that moved the coordinator out of
    /// [`Phase::Running`]; later calls have no further effect and do not
    /// overwrite the recorded reason.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        let first = self
            .phase
            .compare_exchange(
                Phase::Running as u8,
                Phase::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if first {
            self.reason.store(reason as u8, Ordering::Release);
            tracing::info!(%reason, "Shutting down, draining workers...");
        }
        self.token.cancel();
        first
    }

    /// Triggers shutdown (if not already) and waits for every worker in `pool`
    /// to exit. The queue is closed when this returns.
    pub async fn drain<G>(&self, pool: &WorkerPool<G>, reason: ShutdownReason)
    where
        G: KeyGenerator,
    {
        self.trigger(reason);
        pool.quiesce().await;
    }

    /// Records that the final flush has completed.
    pub fn finish(&self) {
        self.phase.store(Phase::Stopped as u8, Ordering::Release);
        tracing::info!("Shutdown complete");
    }
}

/// Completes when the process receives Ctrl+C or (on Unix) SIGTERM.
pub async fn termination_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
