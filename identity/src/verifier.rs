//! The verifier capability.

use crate::error::IdentityError;

/// Checks that `signature` authorizes `message` for one identity.
pub trait Verifier: Send + Sync {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError>;
}

impl<V: Verifier + ?Sized> Verifier for Box<V> {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
        (**self).verify(message, signature)
    }
}
