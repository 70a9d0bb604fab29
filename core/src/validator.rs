//! The scheme-generic validator.
//!
//! A request is checked in three stages: the auditing pipeline over the
//! request as a whole, then the issue pipeline for every issue action, then
//! the transfer pipeline for every transfer action. Each pipeline is an
//! ordered list of named checks run until the first failure. After an
//! action's pipeline every metadata entry of the action must have been
//! counted exactly once by its checks.
//!
//! Validation never writes to the ledger.

use std::collections::BTreeMap;
use std::sync::Arc;

use tessera_identity::Deserializer;
use tessera_ledger::{IssueAction, Metadata, StateReader, TransferAction};
use tessera_types::Timestamp;

use crate::context::ValidationContext;
use crate::error::ValidationError;
use crate::pp::PublicParameters;
use crate::request::TokenRequest;
use crate::signature::{RequestSignatureBackend, SignatureProvider};

/// Concrete types of a token scheme.
pub trait Scheme: Sized + 'static {
    type PublicParams: PublicParameters + 'static;
    /// An input token as recorded by the signature check.
    type Input;
    type IssueAction: IssueAction + 'static;
    type TransferAction: TransferAction + 'static;
}

/// Parses the raw action entries of a request.
pub trait ActionDeserializer<S: Scheme>: Send + Sync {
    fn deserialize_actions(
        &self,
        request: &TokenRequest,
    ) -> Result<(Vec<S::IssueAction>, Vec<S::TransferAction>), ValidationError>;
}

pub type CheckFn<S, A> = fn(&mut ValidationContext<'_, S, A>) -> Result<(), ValidationError>;

/// A named pipeline step.
pub struct Check<S: Scheme, A> {
    pub name: &'static str,
    pub run: CheckFn<S, A>,
}

impl<S: Scheme, A> Check<S, A> {
    pub const fn new(name: &'static str, run: CheckFn<S, A>) -> Self {
        Self { name, run }
    }
}

impl<S: Scheme, A> Clone for Check<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            run: self.run,
        }
    }
}

pub struct Validator<S: Scheme> {
    pp: Arc<S::PublicParams>,
    deserializer: Arc<dyn Deserializer>,
    action_deserializer: Box<dyn ActionDeserializer<S>>,
    auditing_checks: Vec<Check<S, TokenRequest>>,
    issue_checks: Vec<Check<S, S::IssueAction>>,
    transfer_checks: Vec<Check<S, S::TransferAction>>,
}

impl<S: Scheme> Validator<S> {
    pub fn new(
        pp: Arc<S::PublicParams>,
        deserializer: Arc<dyn Deserializer>,
        action_deserializer: Box<dyn ActionDeserializer<S>>,
        auditing_checks: Vec<Check<S, TokenRequest>>,
        issue_checks: Vec<Check<S, S::IssueAction>>,
        transfer_checks: Vec<Check<S, S::TransferAction>>,
    ) -> Self {
        Self {
            pp,
            deserializer,
            action_deserializer,
            auditing_checks,
            issue_checks,
            transfer_checks,
        }
    }

    pub fn public_params(&self) -> &Arc<S::PublicParams> {
        &self.pp
    }

    /// Decode a raw request, bind its signatures to `anchor`, and validate it
    /// against the state of `namespace`.
    ///
    /// Signatures are consumed auditor signatures first, then the rest; every
    /// signature must be consumed.
    pub fn verify_token_request_from_raw(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        anchor: &str,
        raw: &[u8],
        now: Timestamp,
    ) -> Result<(Vec<S::IssueAction>, Vec<S::TransferAction>), ValidationError> {
        let request = TokenRequest::from_bytes(raw)?;
        let message = request.message_to_sign(anchor)?;
        let signatures = request
            .auditor_signatures
            .iter()
            .chain(&request.signatures)
            .cloned()
            .collect();
        let mut backend = RequestSignatureBackend::new(message, signatures);

        let actions =
            self.verify_token_request(ledger, namespace, &mut backend, anchor, &request, now)?;
        if backend.remaining() > 0 {
            return Err(ValidationError::UnusedSignatures(backend.remaining()));
        }
        Ok(actions)
    }

    pub fn verify_token_request(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        signature_provider: &mut dyn SignatureProvider,
        anchor: &str,
        request: &TokenRequest,
        now: Timestamp,
    ) -> Result<(Vec<S::IssueAction>, Vec<S::TransferAction>), ValidationError> {
        tracing::debug!(
            namespace,
            anchor,
            issues = request.issues.len(),
            transfers = request.transfers.len(),
            "verifying token request"
        );
        self.verify_auditing(ledger, namespace, signature_provider, anchor, request, now)?;

        let (issues, transfers) = self.action_deserializer.deserialize_actions(request)?;
        for issue in &issues {
            self.verify_issue(ledger, namespace, signature_provider, anchor, issue, now)?;
        }
        for transfer in &transfers {
            self.verify_transfer(ledger, namespace, signature_provider, anchor, transfer, now)?;
        }
        Ok((issues, transfers))
    }

    /// Decode a request's actions without validating them.
    pub fn unmarshal_actions(
        &self,
        raw: &[u8],
    ) -> Result<(Vec<S::IssueAction>, Vec<S::TransferAction>), ValidationError> {
        let request = TokenRequest::from_bytes(raw)?;
        self.action_deserializer.deserialize_actions(&request)
    }

    pub fn verify_auditing(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        signature_provider: &mut dyn SignatureProvider,
        anchor: &str,
        request: &TokenRequest,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let mut ctx = self.context(ledger, namespace, signature_provider, anchor, request, now);
        run_checks(&self.auditing_checks, &mut ctx)
    }

    pub fn verify_issue(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        signature_provider: &mut dyn SignatureProvider,
        anchor: &str,
        action: &S::IssueAction,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let mut ctx = self.context(ledger, namespace, signature_provider, anchor, action, now);
        run_checks(&self.issue_checks, &mut ctx)?;
        counted_metadata(action.metadata(), &ctx)
    }

    pub fn verify_transfer(
        &self,
        ledger: &dyn StateReader,
        namespace: &str,
        signature_provider: &mut dyn SignatureProvider,
        anchor: &str,
        action: &S::TransferAction,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let mut ctx = self.context(ledger, namespace, signature_provider, anchor, action, now);
        run_checks(&self.transfer_checks, &mut ctx)?;
        counted_metadata(action.metadata(), &ctx)
    }

    fn context<'a, A>(
        &'a self,
        ledger: &'a dyn StateReader,
        namespace: &'a str,
        signature_provider: &'a mut dyn SignatureProvider,
        anchor: &'a str,
        action: &'a A,
        now: Timestamp,
    ) -> ValidationContext<'a, S, A> {
        ValidationContext {
            pp: self.pp.as_ref(),
            deserializer: self.deserializer.as_ref(),
            signature_provider,
            ledger,
            namespace,
            anchor,
            action,
            now,
            input_tokens: Vec::new(),
            signatures: Vec::new(),
            metadata_counter: BTreeMap::new(),
        }
    }
}

fn run_checks<S: Scheme, A>(
    checks: &[Check<S, A>],
    ctx: &mut ValidationContext<'_, S, A>,
) -> Result<(), ValidationError> {
    for check in checks {
        tracing::trace!(rule = check.name, anchor = ctx.anchor, "running check");
        (check.run)(ctx).map_err(|e| {
            tracing::debug!(rule = check.name, anchor = ctx.anchor, error = %e, "check failed");
            ValidationError::Rule {
                rule: check.name,
                source: Box::new(e),
            }
        })?;
    }
    Ok(())
}

const METADATA_COUNTER_RULE: &str = "metadata-counter";

fn counted_metadata<S: Scheme, A>(
    metadata: &Metadata,
    ctx: &ValidationContext<'_, S, A>,
) -> Result<(), ValidationError> {
    check_metadata_counter(metadata, &ctx.metadata_counter).map_err(|e| {
        tracing::debug!(
            rule = METADATA_COUNTER_RULE,
            anchor = ctx.anchor,
            error = %e,
            "check failed"
        );
        ValidationError::Rule {
            rule: METADATA_COUNTER_RULE,
            source: Box::new(e),
        }
    })
}

/// Every metadata entry must be counted exactly once.
pub fn check_metadata_counter(
    metadata: &Metadata,
    counter: &BTreeMap<String, usize>,
) -> Result<(), ValidationError> {
    for (key, count) in counter {
        if *count > 1 {
            return Err(ValidationError::MetadataReplay(key.clone()));
        }
    }
    let validated = counter
        .iter()
        .filter(|(key, count)| **count == 1 && metadata.contains_key(*key))
        .count();
    if validated != metadata.len() || counter.len() != metadata.len() {
        return Err(ValidationError::UnvalidatedMetadata {
            validated,
            total: metadata.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(keys: &[&str]) -> Metadata {
        keys.iter().map(|k| (k.to_string(), vec![1])).collect()
    }

    #[test]
    fn every_key_counted_once_passes() {
        let m = metadata(&["a", "b"]);
        let c = BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 1)]);
        assert!(check_metadata_counter(&m, &c).is_ok());
        assert!(check_metadata_counter(&Metadata::new(), &BTreeMap::new()).is_ok());
    }

    #[test]
    fn double_count_is_replay() {
        let m = metadata(&["a"]);
        let c = BTreeMap::from([("a".to_string(), 2)]);
        assert!(matches!(
            check_metadata_counter(&m, &c),
            Err(ValidationError::MetadataReplay(k)) if k == "a"
        ));
    }

    #[test]
    fn uncounted_key_is_rejected() {
        let m = metadata(&["a", "b"]);
        let c = BTreeMap::from([("a".to_string(), 1)]);
        assert!(matches!(
            check_metadata_counter(&m, &c),
            Err(ValidationError::UnvalidatedMetadata {
                validated: 1,
                total: 2
            })
        ));
    }

    #[test]
    fn counted_key_missing_from_metadata_is_rejected() {
        let m = metadata(&["a"]);
        let c = BTreeMap::from([("b".to_string(), 1)]);
        assert!(check_metadata_counter(&m, &c).is_err());
    }
}
