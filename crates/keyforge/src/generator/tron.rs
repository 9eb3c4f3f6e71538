use crate::{Error, GeneratedItem, KeyGenerator, Result, tron_address};
use rand::{TryRngCore, rngs::OsRng};
use secp256k1::{PublicKey, SecretKey};

/// Number of fresh candidates drawn before giving up on a secret.
///
/// A uniformly random 32-byte value is an invalid secp256k1 scalar with
/// probability below 2^-127, so exhausting this indicates a broken entropy
/// source rather than bad luck.
const MAX_SECRET_ATTEMPTS: usize = 4;

/// Generates TRON keypairs from the operating system entropy source.
///
/// The generator is stateless: each call reads 32 bytes from [`OsRng`] and
/// derives the address with the global secp256k1 context, so a single
/// instance can be shared by every worker.
#[derive(Default, Clone, Copy, Debug)]
pub struct TronGenerator;

impl TronGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// Builds an item from known secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSecret`] if `bytes` is zero or not below the
    /// curve order.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<GeneratedItem> {
        let secret_key = SecretKey::from_slice(bytes)?;
        Ok(Self::item_for(&secret_key))
    }

    fn item_for(secret_key: &SecretKey) -> GeneratedItem {
        let public_key = PublicKey::from_secret_key_global(secret_key);
        GeneratedItem::new(
            hex::encode(secret_key.secret_bytes()),
            tron_address(&public_key),
        )
    }
}

impl KeyGenerator for TronGenerator {
    fn try_generate(&self) -> Result<GeneratedItem> {
        let mut bytes = [0_u8; 32];
        let mut last_err = None;

        for _ in 0..MAX_SECRET_ATTEMPTS {
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| Error::Entropy {
                    reason: e.to_string(),
                })?;

            match Self::from_secret_bytes(&bytes) {
                Ok(item) => return Ok(item),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or(Error::Entropy {
            reason: "no secret candidates drawn".to_owned(),
        }))
    }
}
