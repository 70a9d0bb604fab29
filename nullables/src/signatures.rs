//! Nullable signature provider for exercising single checks.

use std::collections::VecDeque;

use tessera_core::{SignatureProvider, ValidationError};
use tessera_identity::Verifier;
use tessera_types::Identity;

/// Hands out canned signatures without verifying them, and records who
/// was asked to sign.
#[derive(Default)]
pub struct NullSignatureProvider {
    signatures: VecDeque<Vec<u8>>,
    requested: Vec<Identity>,
    unlimited: bool,
}

impl NullSignatureProvider {
    /// Returns an empty signature for every request.
    pub fn accepting() -> Self {
        Self {
            unlimited: true,
            ..Self::default()
        }
    }

    /// Returns `signatures` in order, then fails with
    /// `InsufficientSignatures`.
    pub fn with_signatures(signatures: Vec<Vec<u8>>) -> Self {
        Self {
            signatures: signatures.into(),
            ..Self::default()
        }
    }

    pub fn requested(&self) -> &[Identity] {
        &self.requested
    }
}

impl SignatureProvider for NullSignatureProvider {
    fn has_been_signed_by(
        &mut self,
        identity: &Identity,
        _verifier: &dyn Verifier,
    ) -> Result<Vec<u8>, ValidationError> {
        self.requested.push(identity.clone());
        match self.signatures.pop_front() {
            Some(signature) => Ok(signature),
            None if self.unlimited => Ok(Vec::new()),
            None => Err(ValidationError::InsufficientSignatures),
        }
    }
}
