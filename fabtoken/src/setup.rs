//! Public parameters of the transparent scheme.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_core::{driver_identifier, PublicParameters, PublicParamsError, SerializedPublicParams};
use tessera_types::{max_for_precision, Identity, MAX_PRECISION};

pub const DRIVER_NAME: &str = "fabtoken";
pub const PROTOCOL_V1: u64 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParams {
    pub driver_name: String,
    pub driver_version: u64,
    pub quantity_precision: u64,
    /// Always `2^quantity_precision - 1`.
    pub max_token: u64,
    pub auditor: Option<Identity>,
    /// Authorized issuers; empty means anyone may issue.
    pub issuer_ids: Vec<Identity>,
    pub extra_data: BTreeMap<String, Vec<u8>>,
}

impl PublicParams {
    /// Parameters for the current protocol version.
    pub fn setup(precision: u64) -> Result<Self, PublicParamsError> {
        Self::with_version(precision, PROTOCOL_V1)
    }

    pub fn with_version(precision: u64, version: u64) -> Result<Self, PublicParamsError> {
        Self::new_with(DRIVER_NAME, version, precision)
    }

    pub fn new_with(
        driver_name: &str,
        driver_version: u64,
        precision: u64,
    ) -> Result<Self, PublicParamsError> {
        let max_token =
            max_for_precision(precision)
                .map_err(|_| PublicParamsError::InvalidPrecision(precision))?;
        Ok(Self {
            driver_name: driver_name.to_string(),
            driver_version,
            quantity_precision: precision,
            max_token,
            auditor: None,
            issuer_ids: Vec::new(),
            extra_data: BTreeMap::new(),
        })
    }

    /// Decode the current protocol version's envelope.
    pub fn deserialize(raw: &[u8]) -> Result<Self, PublicParamsError> {
        Self::from_bytes(raw, DRIVER_NAME, PROTOCOL_V1)
    }

    pub fn from_bytes(raw: &[u8], name: &str, version: u64) -> Result<Self, PublicParamsError> {
        let payload = SerializedPublicParams::open(raw, &driver_identifier(name, version))?;
        let pp: PublicParams = bincode::deserialize(&payload)
            .map_err(|e| PublicParamsError::Malformed(e.to_string()))?;
        if pp.driver_name != name || pp.driver_version != version {
            return Err(PublicParamsError::LabelMismatch {
                expected: driver_identifier(name, version),
                actual: driver_identifier(&pp.driver_name, pp.driver_version),
            });
        }
        Ok(pp)
    }

    pub fn add_issuer(&mut self, issuer: Identity) {
        self.issuer_ids.push(issuer);
    }

    pub fn set_issuers(&mut self, issuers: Vec<Identity>) {
        self.issuer_ids = issuers;
    }

    pub fn add_auditor(&mut self, auditor: Identity) {
        self.auditor = Some(auditor);
    }

    /// Only one auditor is supported; the first entry wins.
    pub fn set_auditors(&mut self, auditors: Vec<Identity>) -> Result<(), PublicParamsError> {
        let first = auditors.into_iter().next().ok_or(PublicParamsError::NoAuditors)?;
        self.auditor = Some(first);
        Ok(())
    }

    /// Human-readable rendering.
    pub fn to_json(&self) -> Result<String, PublicParamsError> {
        serde_json::to_string_pretty(self).map_err(|e| PublicParamsError::Malformed(e.to_string()))
    }
}

impl PublicParameters for PublicParams {
    fn identifier(&self) -> String {
        driver_identifier(&self.driver_name, self.driver_version)
    }

    fn precision(&self) -> u64 {
        self.quantity_precision
    }

    fn max_token_value(&self) -> u64 {
        self.max_token
    }

    fn issuers(&self) -> &[Identity] {
        &self.issuer_ids
    }

    fn auditors(&self) -> Vec<Identity> {
        self.auditor.iter().cloned().collect()
    }

    fn graph_hiding(&self) -> bool {
        false
    }

    fn validate(&self) -> Result<(), PublicParamsError> {
        if self.quantity_precision == 0 || self.quantity_precision > MAX_PRECISION {
            return Err(PublicParamsError::InvalidPrecision(self.quantity_precision));
        }
        let expected = max_for_precision(self.quantity_precision)
            .map_err(|_| PublicParamsError::InvalidPrecision(self.quantity_precision))?;
        if self.max_token != expected {
            return Err(PublicParamsError::InvalidMaxToken {
                max_token: self.max_token,
                expected,
            });
        }
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>, PublicParamsError> {
        let raw =
            bincode::serialize(self).map_err(|e| PublicParamsError::Malformed(e.to_string()))?;
        SerializedPublicParams {
            identifier: self.identifier(),
            raw,
        }
        .to_bytes()
    }
}
