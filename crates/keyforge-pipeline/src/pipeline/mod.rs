//! The adaptive generation-and-persistence pipeline.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env configuration.
//! - [`control`] - load sampling and the rate controller.
//! - [`error`] - pipeline error type.
//! - [`pool`] - the resizable worker pool and worker loop.
//! - [`runtime`] - [`runtime::Pipeline`], which wires everything together.
//! - [`shutdown`] - shutdown coordination and process signal handling.
//! - [`sink`] - the store interface, SQLite store and batch aggregator.
//! - [`telemetry`] - logging setup and progress counters.

pub mod config;
pub mod control;
pub mod error;
pub mod pool;
pub mod runtime;
pub mod shutdown;
pub mod sink;
pub mod telemetry;

#[cfg(test)]
mod test_support;
