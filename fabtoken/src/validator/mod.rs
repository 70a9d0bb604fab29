//! Validation pipelines of the transparent scheme.
//!
//! Issue: action structure, quantities, issuer authorization, issuer
//! signature, application data.
//!
//! Transfer: action structure, inputs against the ledger, owner
//! signatures, balance, HTLC rules, application data.

mod htlc;
mod issue;
mod transfer;

use std::sync::Arc;

use tessera_core::auditing::auditing_signatures_validate;
use tessera_core::{
    ActionDeserializer, Check, Scheme, TokenRequest, ValidationContext, ValidationError, Validator,
};
use tessera_identity::Deserializer;

use crate::actions::{IssueAction, Output, TransferAction};
use crate::setup::PublicParams;

pub use htlc::transfer_htlc_validate;
pub use issue::{
    issue_action_validate, issue_application_data_validate, issue_issuer_validate,
    issue_quantities_validate, issue_signature_validate,
};
pub use transfer::{
    transfer_action_validate, transfer_application_data_validate, transfer_balance_validate,
    transfer_inputs_validate, transfer_signature_validate,
};

/// Metadata keys under this prefix are application data, accepted as is.
pub const APPLICATION_DATA_PREFIX: &str = "pub.";

pub struct FabToken;

impl Scheme for FabToken {
    type PublicParams = PublicParams;
    type Input = Output;
    type IssueAction = IssueAction;
    type TransferAction = TransferAction;
}

pub type Context<'a, A> = ValidationContext<'a, FabToken, A>;

pub fn auditing_checks() -> Vec<Check<FabToken, TokenRequest>> {
    vec![Check::new("auditing-signatures", auditing_signatures_validate::<FabToken>)]
}

pub fn issue_checks() -> Vec<Check<FabToken, IssueAction>> {
    vec![
        Check::new("issue-action", issue_action_validate),
        Check::new("issue-quantities", issue_quantities_validate),
        Check::new("issue-issuer", issue_issuer_validate),
        Check::new("issue-signature", issue_signature_validate),
        Check::new("issue-application-data", issue_application_data_validate),
    ]
}

pub fn transfer_checks() -> Vec<Check<FabToken, TransferAction>> {
    vec![
        Check::new("transfer-action", transfer_action_validate),
        Check::new("transfer-inputs", transfer_inputs_validate),
        Check::new("transfer-signature", transfer_signature_validate),
        Check::new("transfer-balance", transfer_balance_validate),
        Check::new("transfer-htlc", transfer_htlc_validate),
        Check::new("transfer-application-data", transfer_application_data_validate),
    ]
}

/// Decodes every action entry of a request independently.
#[derive(Debug, Default)]
pub struct FabTokenActionDeserializer;

impl ActionDeserializer<FabToken> for FabTokenActionDeserializer {
    fn deserialize_actions(
        &self,
        request: &TokenRequest,
    ) -> Result<(Vec<IssueAction>, Vec<TransferAction>), ValidationError> {
        let issues = request
            .issues
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                IssueAction::from_bytes(raw)
                    .map_err(|e| ValidationError::MalformedAction(format!("issue [{i}]: {e}")))
            })
            .collect::<Result<_, _>>()?;
        let transfers = request
            .transfers
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                TransferAction::from_bytes(raw)
                    .map_err(|e| ValidationError::MalformedAction(format!("transfer [{i}]: {e}")))
            })
            .collect::<Result<_, _>>()?;
        Ok((issues, transfers))
    }
}

/// A validator running the default pipelines.
pub fn new_validator(
    pp: Arc<PublicParams>,
    deserializer: Arc<dyn Deserializer>,
) -> Validator<FabToken> {
    Validator::new(
        pp,
        deserializer,
        Box::new(FabTokenActionDeserializer),
        auditing_checks(),
        issue_checks(),
        transfer_checks(),
    )
}

fn count_application_data<A>(ctx: &mut Context<'_, A>, metadata: &tessera_ledger::Metadata) {
    for key in metadata.keys() {
        if key.starts_with(APPLICATION_DATA_PREFIX) {
            ctx.count_metadata_key(key.as_str());
        }
    }
}
