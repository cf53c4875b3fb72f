//! Thin wrapper around `secrecy` for values that must be zeroized when
//! dropped: the Diffie-Hellman secret exponent and the derived session
//! key.

use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretBox};

/// A value that is zeroized on drop and only reachable through
/// [`Secret::expose_secret`].
pub struct Secret<T: Zeroize> {
    inner: SecretBox<T>,
}

impl<T: Zeroize> Secret<T> {
    /// Wraps `data`, taking ownership.
    pub fn new(data: T) -> Self {
        Self { inner: SecretBox::new(Box::new(data)) }
    }

    /// Borrows the protected value.
    pub fn expose_secret(&self) -> &T {
        self.inner.expose_secret()
    }
}
