//! Error types for keypair generation.
//!
//! ## Error Cases
//! - `Entropy`: The operating system entropy source could not be read.
//! - `InvalidSecret`: Candidate secret bytes did not form a valid secp256k1
//!   scalar (zero or not below the curve order).

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that key generation can produce.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The entropy source failed. This is not recoverable by retrying.
    #[error("Entropy source unavailable: {reason}")]
    Entropy { reason: String },

    /// The secret bytes are not a valid secp256k1 secret key.
    #[error("Invalid secret key: {0}")]
    InvalidSecret(#[from] secp256k1::Error),
}
