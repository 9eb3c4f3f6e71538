//! Error types for the generation pipeline.
//!
//! Every variant here is fatal: the pipeline stops and the process exits with
//! a non-zero status. Transient conditions (a single failed load sample) are
//! logged where they occur and never surface as an [`Error`].
//!
//! ## Error Cases
//! - `Generation`: The key generator failed (entropy source unavailable).
//! - `Store`: A SQLite operation failed; `operation` names which one.
//! - `Io`: Preparing the database location on disk failed.
//! - `LoadSample`: CPU utilization could not be read for a control tick.
//! - `Join`: A pipeline task panicked or was aborted.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the generation pipeline.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The key generator failed.
    #[error("Key generation failed: {0}")]
    Generation(#[from] keyforge::Error),

    /// A store operation failed.
    #[error("Store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Filesystem preparation for the store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The load sampler could not produce a reading.
    #[error("Load sample unavailable: {reason}")]
    LoadSample { reason: String },

    /// A background task did not run to completion.
    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Returns a mapper that tags a SQLite error with the failing operation.
    pub fn store(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Store { operation, source }
    }
}
