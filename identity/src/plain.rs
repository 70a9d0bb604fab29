//! Plain identities: a bare Ed25519 public key.

use tessera_crypto::verify_signature;
use tessera_types::{Identity, PublicKey, Signature};

use crate::deserializer::{OwnerResolver, TypedVerifierDeserializer};
use crate::error::IdentityError;
use crate::verifier::Verifier;

/// Verifies Ed25519 signatures for a single public key.
#[derive(Clone, Debug)]
pub struct PlainVerifier {
    public_key: PublicKey,
}

impl PlainVerifier {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }

    /// Build a verifier from raw identity bytes (the 32-byte key).
    pub fn from_identity(identity: &[u8]) -> Result<Self, IdentityError> {
        let public_key =
            PublicKey::from_slice(identity).map_err(|e| IdentityError::malformed("plain", e))?;
        Ok(Self { public_key })
    }
}

impl Verifier for PlainVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
        let signature =
            Signature::from_slice(signature)
                .map_err(|e| IdentityError::InvalidSignature(e.to_string()))?;
        if verify_signature(message, &signature, &self.public_key) {
            Ok(())
        } else {
            Err(IdentityError::InvalidSignature(
                "ed25519 signature does not verify".into(),
            ))
        }
    }
}

/// Table entry for the `plain` owner tag.
#[derive(Debug, Default)]
pub struct PlainDeserializer;

impl TypedVerifierDeserializer for PlainDeserializer {
    fn verifier(
        &self,
        payload: &[u8],
        _resolver: &dyn OwnerResolver,
    ) -> Result<Box<dyn Verifier>, IdentityError> {
        Ok(Box::new(PlainVerifier::from_identity(payload)?))
    }

    fn recipients(
        &self,
        owner: &Identity,
        payload: &[u8],
        _resolver: &dyn OwnerResolver,
    ) -> Result<Vec<Identity>, IdentityError> {
        PublicKey::from_slice(payload).map_err(|e| IdentityError::malformed("plain", e))?;
        Ok(vec![owner.clone()])
    }
}
