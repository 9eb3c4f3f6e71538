//! Persistence side of the pipeline.
//!
//! - [`store`] - the [`store::Store`] interface and its SQLite implementation.
//! - [`aggregator`] - the single consumer that batches queued items into the
//!   store.

pub mod aggregator;
pub mod store;
