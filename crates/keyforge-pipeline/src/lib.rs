#![doc = include_str!("../README.md")]

mod pipeline;

pub use pipeline::*;
