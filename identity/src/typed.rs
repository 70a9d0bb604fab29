//! Typed owner identities.
//!
//! On the wire an owner is a bincode [`TypedIdentity`]: a type tag plus a
//! tag-specific payload. [`Owner`] is the decoded form.

use std::fmt;

use serde::{Deserialize, Serialize};
use tessera_types::{Identity, PublicKey};

use crate::error::IdentityError;
use crate::htlc::Script;
use crate::multisig::MultiIdentity;

/// Owner identity kinds understood by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OwnerKind {
    Plain,
    Htlc,
    Multisig,
}

impl OwnerKind {
    pub const ALL: [OwnerKind; 3] = [OwnerKind::Plain, OwnerKind::Htlc, OwnerKind::Multisig];

    pub fn tag(&self) -> &'static str {
        match self {
            OwnerKind::Plain => "plain",
            OwnerKind::Htlc => "htlc",
            OwnerKind::Multisig => "multisig",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, IdentityError> {
        match tag {
            "plain" => Ok(OwnerKind::Plain),
            "htlc" => Ok(OwnerKind::Htlc),
            "multisig" => Ok(OwnerKind::Multisig),
            other => Err(IdentityError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Wire envelope of an owner identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedIdentity {
    pub identity_type: String,
    pub identity: Vec<u8>,
}

impl TypedIdentity {
    pub fn new(kind: OwnerKind, payload: Vec<u8>) -> Self {
        Self {
            identity_type: kind.tag().to_string(),
            identity: payload,
        }
    }

    pub fn from_identity(identity: &Identity) -> Result<Self, IdentityError> {
        if identity.is_none() {
            return Err(IdentityError::malformed("typed", "empty identity"));
        }
        bincode::deserialize(identity.as_bytes()).map_err(|e| IdentityError::malformed("typed", e))
    }

    pub fn to_identity(&self) -> Result<Identity, IdentityError> {
        bincode::serialize(self)
            .map(Identity::new)
            .map_err(|e| IdentityError::malformed("typed", e))
    }
}

/// A decoded owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Owner {
    /// A plain signer; the payload is its raw public key identity.
    Plain(Identity),
    /// A hashed time-lock script.
    Htlc(Script),
    /// An escrow requiring every party to sign.
    Multisig(MultiIdentity),
}

impl Owner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            Owner::Plain(_) => OwnerKind::Plain,
            Owner::Htlc(_) => OwnerKind::Htlc,
            Owner::Multisig(_) => OwnerKind::Multisig,
        }
    }

    /// Decode an owner identity. Unknown tags fail with `UnknownType`.
    pub fn decode(identity: &Identity) -> Result<Self, IdentityError> {
        let typed = TypedIdentity::from_identity(identity)?;
        match OwnerKind::from_tag(&typed.identity_type)? {
            OwnerKind::Plain => Ok(Owner::Plain(Identity::new(typed.identity))),
            OwnerKind::Htlc => Ok(Owner::Htlc(Script::from_bytes(&typed.identity)?)),
            OwnerKind::Multisig => Ok(Owner::Multisig(MultiIdentity::from_bytes(
                &typed.identity,
            )?)),
        }
    }

    pub fn encode(&self) -> Result<Identity, IdentityError> {
        let payload = match self {
            Owner::Plain(id) => id.as_bytes().to_vec(),
            Owner::Htlc(script) => script.to_bytes()?,
            Owner::Multisig(multi) => multi.to_bytes()?,
        };
        TypedIdentity::new(self.kind(), payload).to_identity()
    }

    /// Owner identity for a plain Ed25519 key.
    pub fn plain(public_key: &PublicKey) -> Result<Identity, IdentityError> {
        Owner::Plain(public_key.to_identity()).encode()
    }

    /// The HTLC script, when this owner is one.
    pub fn as_htlc(&self) -> Option<&Script> {
        match self {
            Owner::Htlc(script) => Some(script),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::htlc::{Encoding, HashFunction, HashInfo};

    #[test]
    fn tags_round_trip() {
        for kind in OwnerKind::ALL {
            assert_eq!(OwnerKind::from_tag(kind.tag()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let typed = TypedIdentity {
            identity_type: "x509".into(),
            identity: vec![1, 2, 3],
        };
        let id = typed.to_identity().unwrap();
        assert!(matches!(
            Owner::decode(&id),
            Err(IdentityError::UnknownType(tag)) if tag == "x509"
        ));
    }

    #[test]
    fn plain_owner_decodes() {
        let pk = PublicKey([4u8; 32]);
        let id = Owner::plain(&pk).unwrap();
        assert_eq!(Owner::decode(&id).unwrap(), Owner::Plain(pk.to_identity()));
    }

    #[test]
    fn htlc_owner_exposes_its_script() {
        let script = Script {
            sender: Owner::plain(&PublicKey([1u8; 32])).unwrap(),
            recipient: Owner::plain(&PublicKey([2u8; 32])).unwrap(),
            deadline: tessera_types::Timestamp::new(10),
            hash_info: HashInfo {
                hash: vec![7; 32],
                hash_func: HashFunction::Sha256,
                encoding: Encoding::None,
            },
        };
        let id = Owner::Htlc(script.clone()).encode().unwrap();
        assert_eq!(Owner::decode(&id).unwrap().as_htlc(), Some(&script));

        let plain = Owner::plain(&PublicKey([4u8; 32])).unwrap();
        assert_eq!(Owner::decode(&plain).unwrap().as_htlc(), None);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            Owner::decode(&Identity::new(vec![0xFF, 0x01])),
            Err(IdentityError::Malformed { kind: "typed", .. })
        ));
        assert!(Owner::decode(&Identity::default()).is_err());
    }
}
