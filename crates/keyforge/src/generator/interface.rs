use crate::{GeneratedItem, Result};

/// A minimal interface for producing keypairs.
///
/// Implementations are shared by every worker in a pool, so generation takes
/// `&self` and must be safe to call from many threads at once.
pub trait KeyGenerator: Send + Sync + 'static {
    /// Generates the next secret and its derived address.
    ///
    /// # Errors
    ///
    /// Returns an error if the entropy source is unavailable. Callers should
    /// treat this as unrecoverable.
    fn try_generate(&self) -> Result<GeneratedItem>;
}
