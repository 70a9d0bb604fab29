//! Drivers and the registry that resolves them.
//!
//! The registry is an ordinary value: build it once at start-up, register
//! the drivers the deployment supports, and pass it to whatever needs to
//! turn stored public parameters into a validator.

use std::collections::BTreeMap;
use std::sync::Arc;

use tessera_ledger::{Action, IssueAction, StateReader, TransferAction};
use tessera_types::Timestamp;

use crate::error::{DriverError, ValidationError};
use crate::pp::{PublicParameters, SerializedPublicParams};
use crate::validator::{Scheme, Validator};

/// An action that passed validation, ready for the translator.
pub enum ValidatedAction {
    Issue(Box<dyn IssueAction>),
    Transfer(Box<dyn TransferAction>),
}

impl ValidatedAction {
    pub fn as_action(&self) -> Action<'_> {
        match self {
            ValidatedAction::Issue(issue) => Action::Issue(issue.as_ref()),
            ValidatedAction::Transfer(transfer) => Action::Transfer(transfer.as_ref()),
        }
    }
}

/// Object-safe face of a [`Validator`], for callers that pick the scheme
/// at run time.
pub trait TokenRequestValidator {
    fn public_params(&self) -> Arc<dyn PublicParameters>;

    /// Validate a raw request; issues come before transfers in the result.
    fn verify_token_request_from_raw(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        anchor: &str,
        raw: &[u8],
        now: Timestamp,
    ) -> Result<Vec<ValidatedAction>, ValidationError>;

    fn unmarshal_actions(&self, raw: &[u8]) -> Result<Vec<ValidatedAction>, ValidationError>;
}

fn box_actions<S: Scheme>(
    (issues, transfers): (Vec<S::IssueAction>, Vec<S::TransferAction>),
) -> Vec<ValidatedAction> {
    issues
        .into_iter()
        .map(|a| ValidatedAction::Issue(Box::new(a)))
        .chain(
            transfers
                .into_iter()
                .map(|a| ValidatedAction::Transfer(Box::new(a))),
        )
        .collect()
}

impl<S: Scheme> TokenRequestValidator for Validator<S> {
    fn public_params(&self) -> Arc<dyn PublicParameters> {
        Validator::public_params(self).clone()
    }

    fn verify_token_request_from_raw(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        anchor: &str,
        raw: &[u8],
        now: Timestamp,
    ) -> Result<Vec<ValidatedAction>, ValidationError> {
        Validator::verify_token_request_from_raw(self, ledger, namespace, anchor, raw, now)
            .map(box_actions::<S>)
    }

    fn unmarshal_actions(&self, raw: &[u8]) -> Result<Vec<ValidatedAction>, ValidationError> {
        Validator::unmarshal_actions(self, raw).map(box_actions::<S>)
    }
}

/// A token scheme at one version.
pub trait Driver: Send + Sync {
    /// The envelope identifier this driver understands.
    fn identifier(&self) -> String;

    fn public_params_from_bytes(
        &self,
        raw: &[u8],
    ) -> Result<Arc<dyn PublicParameters>, DriverError>;

    fn new_validator(&self, raw: &[u8]) -> Result<Box<dyn TokenRequestValidator>, DriverError>;
}

#[derive(Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Box<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) -> Result<(), DriverError> {
        let identifier = driver.identifier();
        if self.drivers.contains_key(&identifier) {
            return Err(DriverError::DuplicateDriver(identifier));
        }
        tracing::debug!(driver = %identifier, "registered token driver");
        self.drivers.insert(identifier, driver);
        Ok(())
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    pub fn driver(&self, identifier: &str) -> Result<&dyn Driver, DriverError> {
        self.drivers
            .get(identifier)
            .map(|d| d.as_ref())
            .ok_or_else(|| DriverError::UnknownDriver(identifier.to_string()))
    }

    /// Decode stored parameters with the driver named by their envelope.
    pub fn public_params_from_bytes(
        &self,
        raw: &[u8],
    ) -> Result<Arc<dyn PublicParameters>, DriverError> {
        let envelope = SerializedPublicParams::from_bytes(raw)?;
        self.driver(&envelope.identifier)?.public_params_from_bytes(raw)
    }

    /// Build a validator for stored parameters.
    pub fn new_validator(&self, raw: &[u8]) -> Result<Box<dyn TokenRequestValidator>, DriverError> {
        let envelope = SerializedPublicParams::from_bytes(raw)?;
        self.driver(&envelope.identifier)?.new_validator(raw)
    }
}
