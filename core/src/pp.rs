//! Public parameters shared by every scheme, and their wire envelope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_crypto::sha256;
use tessera_types::Identity;

use crate::error::PublicParamsError;

/// Identifier carried by the envelope of a scheme's parameters.
pub fn driver_identifier(name: &str, version: u64) -> String {
    format!("{name}/v{version}")
}

/// What validators and translators need from a scheme's parameters.
pub trait PublicParameters: Send + Sync {
    /// Envelope identifier, see [`driver_identifier`].
    fn identifier(&self) -> String;
    fn precision(&self) -> u64;
    fn max_token_value(&self) -> u64;
    fn issuers(&self) -> &[Identity];
    fn auditors(&self) -> Vec<Identity>;
    /// Whether spent inputs are tracked by serial number.
    fn graph_hiding(&self) -> bool;
    fn validate(&self) -> Result<(), PublicParamsError>;
    /// Envelope bytes, as stored in the ledger's setup slot.
    fn to_bytes(&self) -> Result<Vec<u8>, PublicParamsError>;
}

/// `{identifier, raw}`: `raw` is the scheme-specific encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedPublicParams {
    pub identifier: String,
    pub raw: Vec<u8>,
}

impl SerializedPublicParams {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, PublicParamsError> {
        bincode::deserialize(raw).map_err(|e| PublicParamsError::Malformed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PublicParamsError> {
        bincode::serialize(self).map_err(|e| PublicParamsError::Malformed(e.to_string()))
    }

    /// Unwrap the payload, checking the identifier.
    pub fn open(raw: &[u8], expected: &str) -> Result<Vec<u8>, PublicParamsError> {
        let envelope = Self::from_bytes(raw)?;
        if envelope.identifier != expected {
            return Err(PublicParamsError::LabelMismatch {
                expected: expected.to_string(),
                actual: envelope.identifier,
            });
        }
        Ok(envelope.raw)
    }
}

/// Holds the parameters of one token-management scope.
pub struct PublicParamsManager<P: PublicParameters + ?Sized> {
    pp: Arc<P>,
}

impl<P: PublicParameters + ?Sized> PublicParamsManager<P> {
    pub fn new(pp: Arc<P>) -> Result<Self, PublicParamsError> {
        pp.validate()?;
        Ok(Self { pp })
    }

    pub fn public_params(&self) -> &Arc<P> {
        &self.pp
    }

    /// SHA-256 of the serialized parameters, as written under the setup-hash key.
    pub fn public_params_hash(&self) -> Result<Vec<u8>, PublicParamsError> {
        Ok(sha256(&self.pp.to_bytes()?).to_vec())
    }

    /// Certifier key pairs belong to schemes with a certification role;
    /// no scheme here has one.
    pub fn new_certifier_key_pair(&self) -> Result<(Vec<u8>, Vec<u8>), PublicParamsError> {
        Err(PublicParamsError::NotSupported("certifier key pair generation"))
    }
}
