//! Multisig escrow: a token owned jointly by several identities.

use serde::{Deserialize, Serialize};
use tessera_types::Identity;

use crate::deserializer::{OwnerResolver, TypedVerifierDeserializer};
use crate::error::IdentityError;
use crate::verifier::Verifier;

/// Escrow parties, each an owner identity in its own right.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiIdentity {
    pub identities: Vec<Identity>,
}

impl MultiIdentity {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self, IdentityError> {
        let multi: MultiIdentity =
            bincode::deserialize(raw).map_err(|e| IdentityError::malformed("multisig", e))?;
        if multi.identities.is_empty() {
            return Err(IdentityError::malformed("multisig", "no identities"));
        }
        Ok(multi)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, IdentityError> {
        bincode::serialize(self).map_err(|e| IdentityError::malformed("multisig", e))
    }
}

/// One signature per party, in party order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignature {
    pub signatures: Vec<Vec<u8>>,
}

impl MultiSignature {
    pub fn to_bytes(&self) -> Result<Vec<u8>, IdentityError> {
        bincode::serialize(self).map_err(|e| IdentityError::InvalidSignature(e.to_string()))
    }
}

pub struct MultisigVerifier {
    verifiers: Vec<Box<dyn Verifier>>,
}

impl MultisigVerifier {
    pub fn new(verifiers: Vec<Box<dyn Verifier>>) -> Self {
        Self { verifiers }
    }
}

impl Verifier for MultisigVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
        let multi: MultiSignature = bincode::deserialize(signature)
            .map_err(|e| IdentityError::InvalidSignature(e.to_string()))?;
        if multi.signatures.len() != self.verifiers.len() {
            return Err(IdentityError::SignatureCount {
                expected: self.verifiers.len(),
                actual: multi.signatures.len(),
            });
        }
        for (i, (verifier, sig)) in self.verifiers.iter().zip(&multi.signatures).enumerate() {
            verifier.verify(message, sig).map_err(|e| {
                IdentityError::InvalidSignature(format!("escrow party {i}: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Table entry for the `multisig` owner tag.
#[derive(Debug, Default)]
pub struct MultisigDeserializer;

impl TypedVerifierDeserializer for MultisigDeserializer {
    fn verifier(
        &self,
        payload: &[u8],
        resolver: &dyn OwnerResolver,
    ) -> Result<Box<dyn Verifier>, IdentityError> {
        let multi = MultiIdentity::from_bytes(payload)?;
        let verifiers = multi
            .identities
            .iter()
            .map(|id| resolver.owner_verifier(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(MultisigVerifier::new(verifiers)))
    }

    fn recipients(
        &self,
        _owner: &Identity,
        payload: &[u8],
        resolver: &dyn OwnerResolver,
    ) -> Result<Vec<Identity>, IdentityError> {
        let multi = MultiIdentity::from_bytes(payload)?;
        let mut recipients = Vec::new();
        for id in &multi.identities {
            recipients.extend(resolver.owner_recipients(id)?);
        }
        Ok(recipients)
    }
}
