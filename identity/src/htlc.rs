//! Hashed time-lock contract scripts.
//!
//! Before the deadline the recipient may claim the token by revealing a
//! preimage of `hash_info.hash`; from the deadline on the sender may reclaim
//! it. The preimage must also be published in the transfer metadata under
//! the claim key, and an output locked by a script must publish the lock
//! key, so each script hash appears exactly once in a transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_crypto::{blake2b_256, sha256};
use tessera_types::{Identity, Timestamp};

use crate::deserializer::{OwnerResolver, TypedVerifierDeserializer};
use crate::error::IdentityError;
use crate::typed::Owner;
use crate::verifier::Verifier;

const CLAIM_KEY_PREFIX: &str = "htlc.clk.";
const LOCK_KEY_PREFIX: &str = "htlc.lk.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashFunction {
    Sha256,
    Blake2b256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    None,
    Hex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashInfo {
    pub hash: Vec<u8>,
    pub hash_func: HashFunction,
    pub encoding: Encoding,
}

impl HashInfo {
    /// Compute the image of `preimage` under this hash function and encoding.
    pub fn image(&self, preimage: &[u8]) -> Vec<u8> {
        let digest = match self.hash_func {
            HashFunction::Sha256 => sha256(preimage),
            HashFunction::Blake2b256 => blake2b_256(preimage),
        };
        match self.encoding {
            Encoding::None => digest.to_vec(),
            Encoding::Hex => hex::encode(digest).into_bytes(),
        }
    }

    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.hash.is_empty() {
            return Err(IdentityError::InvalidScript("hash is not set".into()));
        }
        Ok(())
    }
}

/// The script an HTLC owner identity carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub sender: Identity,
    pub recipient: Identity,
    pub deadline: Timestamp,
    pub hash_info: HashInfo,
}

impl Script {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, IdentityError> {
        bincode::deserialize(raw).map_err(|e| IdentityError::malformed("htlc", e))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, IdentityError> {
        bincode::serialize(self).map_err(|e| IdentityError::malformed("htlc", e))
    }

    /// Structural checks plus the deadline: a script may only lock a new
    /// output while its deadline lies in the future.
    pub fn validate(&self, now: Timestamp) -> Result<(), IdentityError> {
        if self.sender.is_none() {
            return Err(IdentityError::InvalidScript("sender not set".into()));
        }
        if self.recipient.is_none() {
            return Err(IdentityError::InvalidScript("recipient not set".into()));
        }
        if now.has_reached(self.deadline) {
            return Err(IdentityError::ScriptExpired {
                deadline: self.deadline,
                now,
            });
        }
        self.hash_info.validate()
    }
}

/// Whether a spend of an HTLC input claims or reclaims it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Claim,
    Reclaim,
}

/// Recipient's claim: a signature over `message || preimage`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSignature {
    pub recipient_signature: Vec<u8>,
    pub preimage: Vec<u8>,
}

/// Signature carried by a spend of an HTLC-owned input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HtlcSignature {
    Claim(ClaimSignature),
    Reclaim(Vec<u8>),
}

impl HtlcSignature {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, IdentityError> {
        bincode::deserialize(raw).map_err(|e| IdentityError::InvalidSignature(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, IdentityError> {
        bincode::serialize(self).map_err(|e| IdentityError::InvalidSignature(e.to_string()))
    }

    pub fn operation(&self) -> Operation {
        match self {
            HtlcSignature::Claim(_) => Operation::Claim,
            HtlcSignature::Reclaim(_) => Operation::Reclaim,
        }
    }
}

/// Metadata key a claim must publish the preimage under.
pub fn claim_key(image: &[u8]) -> String {
    format!("{CLAIM_KEY_PREFIX}{}", hex::encode(image))
}

/// Metadata key a locking output must publish.
pub fn lock_key(hash: &[u8]) -> String {
    format!("{LOCK_KEY_PREFIX}{}", hex::encode(hash))
}

pub fn lock_value(hash: &[u8]) -> Vec<u8> {
    hex::encode(hash).into_bytes()
}

/// Decide whether spending an HTLC input into `output_owner` at `now` is a
/// claim or a reclaim. Before the deadline only the recipient may receive
/// the token; from the deadline on only the sender.
pub fn verify_owner(
    input_owner: &Identity,
    output_owner: &Identity,
    now: Timestamp,
) -> Result<(Script, Operation), IdentityError> {
    let script = match Owner::decode(input_owner)? {
        Owner::Htlc(script) => script,
        other => {
            return Err(IdentityError::InvalidScript(format!(
                "input owner is a {} identity",
                other.kind()
            )))
        }
    };
    if now.has_reached(script.deadline) {
        if &script.sender != output_owner {
            return Err(IdentityError::OwnerMismatch { expected: "sender" });
        }
        Ok((script, Operation::Reclaim))
    } else {
        if &script.recipient != output_owner {
            return Err(IdentityError::OwnerMismatch {
                expected: "recipient",
            });
        }
        Ok((script, Operation::Claim))
    }
}

/// Check that a claim published its preimage under the claim key.
///
/// Returns the key to count, or `None` for a reclaim.
pub fn metadata_claim_key_check(
    metadata: &BTreeMap<String, Vec<u8>>,
    script: &Script,
    op: Operation,
    signature: &[u8],
) -> Result<Option<String>, IdentityError> {
    let claim = match (op, HtlcSignature::from_bytes(signature)?) {
        (Operation::Reclaim, HtlcSignature::Reclaim(_)) => return Ok(None),
        (Operation::Claim, HtlcSignature::Claim(claim)) => claim,
        (expected, _) => {
            return Err(IdentityError::InvalidSignature(format!(
                "signature does not match the {expected:?} operation"
            )))
        }
    };
    if claim.preimage.is_empty() || claim.recipient_signature.is_empty() {
        return Err(IdentityError::InvalidSignature(
            "expected a valid claim preimage and recipient signature".into(),
        ));
    }

    let image = script.hash_info.image(&claim.preimage);
    let key = claim_key(&image);
    match metadata.get(&key) {
        None => Err(IdentityError::MissingMetadata { kind: "claim", key }),
        Some(value) if *value != claim.preimage => {
            Err(IdentityError::MetadataMismatch { kind: "claim", key })
        }
        Some(_) => Ok(Some(key)),
    }
}

/// Check that an output locked by `script` published its lock key.
pub fn metadata_lock_key_check(
    metadata: &BTreeMap<String, Vec<u8>>,
    script: &Script,
) -> Result<String, IdentityError> {
    let key = lock_key(&script.hash_info.hash);
    match metadata.get(&key) {
        None => Err(IdentityError::MissingMetadata { kind: "lock", key }),
        Some(value) if *value != lock_value(&script.hash_info.hash) => {
            Err(IdentityError::MetadataMismatch { kind: "lock", key })
        }
        Some(_) => Ok(key),
    }
}

/// Verifies spends of an HTLC-owned token.
///
/// Deadlines are not checked here: the transfer validator decides claim or
/// reclaim from the validation timestamp and the output owner.
pub struct HtlcVerifier {
    sender: Box<dyn Verifier>,
    recipient: Box<dyn Verifier>,
    hash_info: HashInfo,
}

impl HtlcVerifier {
    pub fn new(
        sender: Box<dyn Verifier>,
        recipient: Box<dyn Verifier>,
        hash_info: HashInfo,
    ) -> Self {
        Self {
            sender,
            recipient,
            hash_info,
        }
    }
}

impl Verifier for HtlcVerifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
        match HtlcSignature::from_bytes(signature)? {
            HtlcSignature::Claim(claim) => {
                if self.hash_info.image(&claim.preimage) != self.hash_info.hash {
                    return Err(IdentityError::InvalidSignature(
                        "hash mismatch: image(preimage) != hash".into(),
                    ));
                }
                let mut signed = message.to_vec();
                signed.extend_from_slice(&claim.preimage);
                self.recipient.verify(&signed, &claim.recipient_signature)
            }
            HtlcSignature::Reclaim(sender_signature) => {
                self.sender.verify(message, &sender_signature)
            }
        }
    }
}

/// Table entry for the `htlc` owner tag.
#[derive(Debug, Default)]
pub struct HtlcDeserializer;

impl TypedVerifierDeserializer for HtlcDeserializer {
    fn verifier(
        &self,
        payload: &[u8],
        resolver: &dyn OwnerResolver,
    ) -> Result<Box<dyn Verifier>, IdentityError> {
        let script = Script::from_bytes(payload)?;
        let sender = resolver.owner_verifier(&script.sender)?;
        let recipient = resolver.owner_verifier(&script.recipient)?;
        Ok(Box::new(HtlcVerifier::new(sender, recipient, script.hash_info)))
    }

    fn recipients(
        &self,
        _owner: &Identity,
        payload: &[u8],
        resolver: &dyn OwnerResolver,
    ) -> Result<Vec<Identity>, IdentityError> {
        let script = Script::from_bytes(payload)?;
        resolver.owner_recipients(&script.recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_crypto::{keypair_from_seed, sign_message};
    use tessera_types::KeyPair;

    fn plain(kp: &KeyPair) -> Identity {
        Owner::plain(&kp.public).unwrap()
    }

    fn script(sender: &KeyPair, recipient: &KeyPair, preimage: &[u8], deadline: u64) -> Script {
        let mut hash_info = HashInfo {
            hash: Vec::new(),
            hash_func: HashFunction::Sha256,
            encoding: Encoding::None,
        };
        hash_info.hash = hash_info.image(preimage);
        Script {
            sender: plain(sender),
            recipient: plain(recipient),
            deadline: Timestamp::new(deadline),
            hash_info,
        }
    }

    #[test]
    fn owner_before_deadline_must_be_recipient() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let sc = script(&s, &r, b"secret", 100);
        let input = Owner::Htlc(sc.clone()).encode().unwrap();

        let (_, op) = verify_owner(&input, &plain(&r), Timestamp::new(99)).unwrap();
        assert_eq!(op, Operation::Claim);
        assert!(matches!(
            verify_owner(&input, &plain(&s), Timestamp::new(99)),
            Err(IdentityError::OwnerMismatch {
                expected: "recipient"
            })
        ));
    }

    #[test]
    fn owner_at_deadline_must_be_sender() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let input = Owner::Htlc(script(&s, &r, b"secret", 100)).encode().unwrap();

        let (_, op) = verify_owner(&input, &plain(&s), Timestamp::new(100)).unwrap();
        assert_eq!(op, Operation::Reclaim);
        assert!(verify_owner(&input, &plain(&r), Timestamp::new(100)).is_err());
    }

    #[test]
    fn script_validate_rejects_elapsed_deadline() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let sc = script(&s, &r, b"secret", 100);
        assert!(sc.validate(Timestamp::new(50)).is_ok());
        assert!(matches!(
            sc.validate(Timestamp::new(100)),
            Err(IdentityError::ScriptExpired { .. })
        ));
    }

    #[test]
    fn claim_key_check_requires_published_preimage() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let sc = script(&s, &r, b"secret", 100);
        let sig = HtlcSignature::Claim(ClaimSignature {
            recipient_signature: vec![1; 64],
            preimage: b"secret".to_vec(),
        })
        .to_bytes()
        .unwrap();

        let mut metadata = BTreeMap::new();
        assert!(matches!(
            metadata_claim_key_check(&metadata, &sc, Operation::Claim, &sig),
            Err(IdentityError::MissingMetadata { kind: "claim", .. })
        ));

        let key = claim_key(&sc.hash_info.hash);
        metadata.insert(key.clone(), b"wrong".to_vec());
        assert!(matches!(
            metadata_claim_key_check(&metadata, &sc, Operation::Claim, &sig),
            Err(IdentityError::MetadataMismatch { .. })
        ));

        metadata.insert(key.clone(), b"secret".to_vec());
        assert_eq!(
            metadata_claim_key_check(&metadata, &sc, Operation::Claim, &sig).unwrap(),
            Some(key)
        );
    }

    #[test]
    fn reclaim_counts_no_key() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let sc = script(&s, &r, b"secret", 100);
        let sig = HtlcSignature::Reclaim(vec![1; 64]).to_bytes().unwrap();
        assert_eq!(
            metadata_claim_key_check(&BTreeMap::new(), &sc, Operation::Reclaim, &sig).unwrap(),
            None
        );
        assert!(metadata_claim_key_check(&BTreeMap::new(), &sc, Operation::Claim, &sig).is_err());
    }

    #[test]
    fn lock_key_check() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let sc = script(&s, &r, b"secret", 100);
        let mut metadata = BTreeMap::new();
        assert!(metadata_lock_key_check(&metadata, &sc).is_err());
        metadata.insert(lock_key(&sc.hash_info.hash), lock_value(&sc.hash_info.hash));
        assert_eq!(
            metadata_lock_key_check(&metadata, &sc).unwrap(),
            lock_key(&sc.hash_info.hash)
        );
    }

    #[test]
    fn verifier_accepts_claim_and_reclaim() {
        let (s, r) = (keypair_from_seed(&[1; 32]), keypair_from_seed(&[2; 32]));
        let sc = script(&s, &r, b"secret", 100);
        let verifier = HtlcVerifier::new(
            Box::new(crate::plain::PlainVerifier::new(s.public.clone())),
            Box::new(crate::plain::PlainVerifier::new(r.public.clone())),
            sc.hash_info.clone(),
        );

        let claim = HtlcSignature::Claim(ClaimSignature {
            recipient_signature: sign_message(b"msgsecret", &r.private).to_vec(),
            preimage: b"secret".to_vec(),
        });
        assert!(verifier.verify(b"msg", &claim.to_bytes().unwrap()).is_ok());

        let wrong = HtlcSignature::Claim(ClaimSignature {
            recipient_signature: sign_message(b"msgnope", &r.private).to_vec(),
            preimage: b"nope".to_vec(),
        });
        assert!(verifier.verify(b"msg", &wrong.to_bytes().unwrap()).is_err());

        let reclaim = HtlcSignature::Reclaim(sign_message(b"msg", &s.private).to_vec());
        assert!(verifier.verify(b"msg", &reclaim.to_bytes().unwrap()).is_ok());
    }

    #[test]
    fn hex_encoding_changes_image() {
        let raw = HashInfo {
            hash: vec![],
            hash_func: HashFunction::Blake2b256,
            encoding: Encoding::None,
        };
        let hexed = HashInfo {
            encoding: Encoding::Hex,
            ..raw.clone()
        };
        assert_eq!(hexed.image(b"p"), hex::encode(raw.image(b"p")).into_bytes());
    }
}
