mod interface;
mod tron;

#[cfg(test)]
mod tests;

pub use interface::*;
pub use tron::*;
