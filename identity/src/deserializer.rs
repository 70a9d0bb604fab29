//! Verifier resolution.
//!
//! [`OwnerDeserializer`] is a table from owner type tag to a
//! [`TypedVerifierDeserializer`]. Entries for wrapping kinds (HTLC, multisig)
//! resolve their nested identities through an [`OwnerResolver`] that points
//! back into the same table, one nesting level deeper.

use std::collections::BTreeMap;

use tessera_types::Identity;

use crate::error::IdentityError;
use crate::htlc::HtlcDeserializer;
use crate::multisig::MultisigDeserializer;
use crate::plain::{PlainDeserializer, PlainVerifier};
use crate::typed::{OwnerKind, TypedIdentity};
use crate::verifier::Verifier;

/// Maximum nesting of wrapped owner identities.
pub const MAX_NESTING: usize = 8;

/// Resolves nested owner identities for wrapping table entries.
pub trait OwnerResolver {
    fn owner_verifier(&self, owner: &Identity) -> Result<Box<dyn Verifier>, IdentityError>;
    fn owner_recipients(&self, owner: &Identity) -> Result<Vec<Identity>, IdentityError>;
}

/// One entry of the owner table: turns a tag-specific payload into a
/// verifier, and reports who receives a token it owns.
pub trait TypedVerifierDeserializer: Send + Sync {
    fn verifier(
        &self,
        payload: &[u8],
        resolver: &dyn OwnerResolver,
    ) -> Result<Box<dyn Verifier>, IdentityError>;

    fn recipients(
        &self,
        owner: &Identity,
        payload: &[u8],
        resolver: &dyn OwnerResolver,
    ) -> Result<Vec<Identity>, IdentityError>;
}

/// The deserializer capability handed to validators.
pub trait Deserializer: Send + Sync {
    fn owner_verifier(&self, owner: &Identity) -> Result<Box<dyn Verifier>, IdentityError>;
    fn issuer_verifier(&self, issuer: &Identity) -> Result<Box<dyn Verifier>, IdentityError>;
    fn auditor_verifier(&self, auditor: &Identity) -> Result<Box<dyn Verifier>, IdentityError>;
    /// Identities that receive the value of a token owned by `owner`.
    fn recipients(&self, owner: &Identity) -> Result<Vec<Identity>, IdentityError>;
}

/// Owner-tag dispatch table.
pub struct OwnerDeserializer {
    table: BTreeMap<String, Box<dyn TypedVerifierDeserializer>>,
}

impl OwnerDeserializer {
    /// A table with an entry for every [`OwnerKind`].
    pub fn new() -> Self {
        let mut deserializer = Self::empty();
        for kind in OwnerKind::ALL {
            let entry: Box<dyn TypedVerifierDeserializer> = match kind {
                OwnerKind::Plain => Box::new(PlainDeserializer),
                OwnerKind::Htlc => Box::new(HtlcDeserializer),
                OwnerKind::Multisig => Box::new(MultisigDeserializer),
            };
            deserializer.register(kind.tag(), entry);
        }
        deserializer
    }

    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Install or replace the entry for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, entry: Box<dyn TypedVerifierDeserializer>) {
        self.table.insert(tag.into(), entry);
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    fn lookup(
        &self,
        owner: &Identity,
        depth: usize,
    ) -> Result<(TypedIdentity, &dyn TypedVerifierDeserializer), IdentityError> {
        if depth > MAX_NESTING {
            return Err(IdentityError::malformed(
                "typed",
                format!("nesting deeper than {MAX_NESTING}"),
            ));
        }
        let typed = TypedIdentity::from_identity(owner)?;
        let entry = self
            .table
            .get(&typed.identity_type)
            .ok_or_else(|| IdentityError::UnknownType(typed.identity_type.clone()))?;
        Ok((typed, entry.as_ref()))
    }

    fn verifier_at(
        &self,
        owner: &Identity,
        depth: usize,
    ) -> Result<Box<dyn Verifier>, IdentityError> {
        let (typed, entry) = self.lookup(owner, depth)?;
        tracing::trace!(identity_type = %typed.identity_type, depth, "resolving owner verifier");
        entry.verifier(&typed.identity, &Nested { table: self, depth: depth + 1 })
    }

    fn recipients_at(
        &self,
        owner: &Identity,
        depth: usize,
    ) -> Result<Vec<Identity>, IdentityError> {
        let (typed, entry) = self.lookup(owner, depth)?;
        entry.recipients(owner, &typed.identity, &Nested { table: self, depth: depth + 1 })
    }
}

impl Default for OwnerDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnerResolver for OwnerDeserializer {
    fn owner_verifier(&self, owner: &Identity) -> Result<Box<dyn Verifier>, IdentityError> {
        self.verifier_at(owner, 0)
    }

    fn owner_recipients(&self, owner: &Identity) -> Result<Vec<Identity>, IdentityError> {
        self.recipients_at(owner, 0)
    }
}

struct Nested<'a> {
    table: &'a OwnerDeserializer,
    depth: usize,
}

impl OwnerResolver for Nested<'_> {
    fn owner_verifier(&self, owner: &Identity) -> Result<Box<dyn Verifier>, IdentityError> {
        self.table.verifier_at(owner, self.depth)
    }

    fn owner_recipients(&self, owner: &Identity) -> Result<Vec<Identity>, IdentityError> {
        self.table.recipients_at(owner, self.depth)
    }
}

/// Owners through the typed table; issuers and auditors are plain keys.
#[derive(Default)]
pub struct TypedDeserializer {
    owners: OwnerDeserializer,
}

impl TypedDeserializer {
    pub fn new(owners: OwnerDeserializer) -> Self {
        Self { owners }
    }
}

impl Deserializer for TypedDeserializer {
    fn owner_verifier(&self, owner: &Identity) -> Result<Box<dyn Verifier>, IdentityError> {
        self.owners.owner_verifier(owner)
    }

    fn issuer_verifier(&self, issuer: &Identity) -> Result<Box<dyn Verifier>, IdentityError> {
        Ok(Box::new(PlainVerifier::from_identity(issuer.as_bytes())?))
    }

    fn auditor_verifier(&self, auditor: &Identity) -> Result<Box<dyn Verifier>, IdentityError> {
        Ok(Box::new(PlainVerifier::from_identity(auditor.as_bytes())?))
    }

    fn recipients(&self, owner: &Identity) -> Result<Vec<Identity>, IdentityError> {
        self.owners.owner_recipients(owner)
    }
}
