use core::fmt;

/// A generated secret and the public address derived from it.
///
/// Items are immutable once produced. They move by value from the worker that
/// generated them, through the queue and batch, into the store.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GeneratedItem {
    secret: String,
    address: String,
}

impl GeneratedItem {
    pub const fn new(secret: String, address: String) -> Self {
        Self { secret, address }
    }

    /// Hex-encoded secret key.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Public address derived from [`GeneratedItem::secret`].
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn into_parts(self) -> (String, String) {
        (self.secret, self.address)
    }
}

// Keep secrets out of logs.
impl fmt::Debug for GeneratedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedItem")
            .field("secret", &"<redacted>")
            .field("address", &self.address)
            .finish()
    }
}
