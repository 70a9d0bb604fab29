//! Deterministic signers and request-signing helpers.

use tessera_core::{TokenRequest, ValidationError};
use tessera_crypto::{generate_keypair, keypair_from_seed, sha256, sign_message, CryptoError};
use tessera_identity::{
    ClaimSignature, Encoding, HashFunction, HashInfo, HtlcSignature, IdentityError, Owner, Script,
};
use tessera_types::{Identity, KeyPair, Timestamp};

/// An Ed25519 key pair derived from a one-byte seed.
pub struct TestSigner {
    keypair: KeyPair,
}

impl TestSigner {
    pub fn from_seed(seed: u8) -> Self {
        Self {
            keypair: keypair_from_seed(&[seed; 32]),
        }
    }

    /// A signer with a fresh random key, unknown to any parameters.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self {
            keypair: generate_keypair()?,
        })
    }

    /// Raw key identity, as used for issuers and auditors.
    pub fn identity(&self) -> Identity {
        self.keypair.public.to_identity()
    }

    /// Plain typed owner identity.
    pub fn owner(&self) -> Result<Identity, IdentityError> {
        Owner::plain(&self.keypair.public)
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        sign_message(message, &self.keypair.private).to_vec()
    }

    /// Recipient's claim of an HTLC input.
    pub fn claim(&self, message: &[u8], preimage: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let mut signed = message.to_vec();
        signed.extend_from_slice(preimage);
        HtlcSignature::Claim(ClaimSignature {
            recipient_signature: self.sign(&signed),
            preimage: preimage.to_vec(),
        })
        .to_bytes()
    }

    /// Sender's reclaim of an HTLC input.
    pub fn reclaim(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        HtlcSignature::Reclaim(self.sign(message)).to_bytes()
    }
}

/// How one signature slot of a request is filled.
pub enum Signing<'a> {
    Plain(&'a TestSigner),
    Claim(&'a TestSigner, &'a [u8]),
    Reclaim(&'a TestSigner),
}

/// Sign `request` bound to `anchor`: auditors first, then `signers` in the
/// order the checks consume them.
pub fn sign_request(
    request: &mut TokenRequest,
    anchor: &str,
    auditors: &[&TestSigner],
    signers: &[Signing<'_>],
) -> Result<(), ValidationError> {
    let message = request.message_to_sign(anchor)?;
    let htlc_err = |e: IdentityError| ValidationError::MalformedRequest(e.to_string());
    request.auditor_signatures = auditors.iter().map(|a| a.sign(&message)).collect();
    request.signatures = signers
        .iter()
        .map(|s| match s {
            Signing::Plain(signer) => Ok(signer.sign(&message)),
            Signing::Claim(signer, preimage) => signer.claim(&message, preimage).map_err(htlc_err),
            Signing::Reclaim(signer) => signer.reclaim(&message).map_err(htlc_err),
        })
        .collect::<Result<_, _>>()?;
    Ok(())
}

/// An HTLC script over SHA-256 of `preimage`.
pub fn sha256_script(
    sender: &TestSigner,
    recipient: &TestSigner,
    preimage: &[u8],
    deadline: Timestamp,
) -> Result<Script, IdentityError> {
    Ok(Script {
        sender: sender.owner()?,
        recipient: recipient.owner()?,
        deadline,
        hash_info: HashInfo {
            hash: sha256(preimage).to_vec(),
            hash_func: HashFunction::Sha256,
            encoding: Encoding::None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_identity::{Deserializer, TypedDeserializer, Verifier};

    #[test]
    fn signed_request_verifies_against_owner() {
        let alice = TestSigner::from_seed(1);
        let mut request = TokenRequest::default();
        request.issues.push(vec![1, 2, 3]);
        sign_request(&mut request, "tx1", &[], &[Signing::Plain(&alice)]).unwrap();

        let message = request.message_to_sign("tx1").unwrap();
        let verifier = TypedDeserializer::default()
            .owner_verifier(&alice.owner().unwrap())
            .unwrap();
        assert!(verifier.verify(&message, &request.signatures[0]).is_ok());
    }

    #[test]
    fn claim_verifies_through_script_owner() {
        let (alice, bob) = (TestSigner::from_seed(1), TestSigner::from_seed(2));
        let script = sha256_script(&alice, &bob, b"secret", Timestamp::new(10)).unwrap();
        let owner = Owner::Htlc(script).encode().unwrap();
        let verifier = TypedDeserializer::default().owner_verifier(&owner).unwrap();
        assert!(verifier
            .verify(b"m", &bob.claim(b"m", b"secret").unwrap())
            .is_ok());
        assert!(verifier.verify(b"m", &alice.reclaim(b"m").unwrap()).is_ok());
        assert!(verifier.verify(b"m", &bob.claim(b"m", b"wrong").unwrap()).is_err());
    }
}
