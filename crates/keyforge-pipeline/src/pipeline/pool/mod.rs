//! Dynamically sized pool of generation workers.
//!
//! - [`manager`] - [`manager::WorkerPool`], which owns worker lifecycles and
//!   the queue sender, and the [`manager::WorkerScaler`] seam used by the
//!   rate controller.
//! - [`worker`] - the per-worker generate-and-submit loop.

pub mod manager;
pub mod worker;
