//! Signature provision for validation.

use tessera_identity::Verifier;
use tessera_types::Identity;

use crate::error::ValidationError;

/// Supplies the signature an identity produced over the request.
pub trait SignatureProvider {
    fn has_been_signed_by(
        &mut self,
        identity: &Identity,
        verifier: &dyn Verifier,
    ) -> Result<Vec<u8>, ValidationError>;
}

/// Hands out a request's signatures in order, verifying each against the
/// request message.
///
/// Checks consume signatures in a fixed order (auditors, then each action
/// in request order), so the position of a signature decides whose it is.
pub struct RequestSignatureBackend {
    message: Vec<u8>,
    signatures: Vec<Vec<u8>>,
    cursor: usize,
}

impl RequestSignatureBackend {
    pub fn new(message: Vec<u8>, signatures: Vec<Vec<u8>>) -> Self {
        Self {
            message,
            signatures,
            cursor: 0,
        }
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Signatures not yet handed out.
    pub fn remaining(&self) -> usize {
        self.signatures.len() - self.cursor
    }
}

impl SignatureProvider for RequestSignatureBackend {
    fn has_been_signed_by(
        &mut self,
        identity: &Identity,
        verifier: &dyn Verifier,
    ) -> Result<Vec<u8>, ValidationError> {
        let signature = self
            .signatures
            .get(self.cursor)
            .ok_or(ValidationError::InsufficientSignatures)?
            .clone();
        self.cursor += 1;

        verifier
            .verify(&self.message, &signature)
            .map_err(|source| ValidationError::SignatureVerification {
                identity: identity.to_string(),
                source,
            })?;
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_identity::IdentityError;

    struct Accepts(&'static [u8]);

    impl Verifier for Accepts {
        fn verify(&self, _message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
            if signature == self.0 {
                Ok(())
            } else {
                Err(IdentityError::InvalidSignature("mismatch".into()))
            }
        }
    }

    #[test]
    fn consumes_signatures_in_order() {
        let mut backend =
            RequestSignatureBackend::new(b"m".to_vec(), vec![b"a".to_vec(), b"b".to_vec()]);
        let id = Identity::new(vec![1]);
        assert_eq!(backend.has_been_signed_by(&id, &Accepts(b"a")).unwrap(), b"a");
        assert_eq!(backend.remaining(), 1);
        assert!(matches!(
            backend.has_been_signed_by(&id, &Accepts(b"a")),
            Err(ValidationError::SignatureVerification { .. })
        ));
        assert!(matches!(
            backend.has_been_signed_by(&id, &Accepts(b"a")),
            Err(ValidationError::InsufficientSignatures)
        ));
    }
}
