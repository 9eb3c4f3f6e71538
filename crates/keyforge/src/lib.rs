#![doc = include_str!("../README.md")]

mod address;
mod error;
mod generator;
mod item;

pub use crate::address::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::item::*;
