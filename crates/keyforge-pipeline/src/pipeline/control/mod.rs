//! Load-driven sizing of the worker pool.
//!
//! - [`sampler`] - [`sampler::LoadSampler`] and the `sysinfo`-backed
//!   [`sampler::SystemLoadSampler`].
//! - [`controller`] - [`controller::RateController`], the periodic
//!   sample/compare/adjust loop.

pub mod controller;
pub mod sampler;
