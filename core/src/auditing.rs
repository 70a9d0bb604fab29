//! Checks over the request as a whole.

use crate::context::ValidationContext;
use crate::error::ValidationError;
use crate::pp::PublicParameters;
use crate::request::TokenRequest;
use crate::validator::Scheme;

/// Without an auditor the request may carry no auditor signatures; with
/// one, each auditor must have signed the request.
pub fn auditing_signatures_validate<S: Scheme>(
    ctx: &mut ValidationContext<'_, S, TokenRequest>,
) -> Result<(), ValidationError> {
    let auditors = ctx.pp.auditors();
    if auditors.is_empty() {
        if !ctx.action.auditor_signatures.is_empty() {
            return Err(ValidationError::AuditorSignaturesPresent);
        }
        return Ok(());
    }

    if ctx.action.auditor_signatures.len() != auditors.len() {
        return Err(ValidationError::AuditorSignatureCount {
            expected: auditors.len(),
            actual: ctx.action.auditor_signatures.len(),
        });
    }
    for auditor in &auditors {
        let verifier = ctx.deserializer.auditor_verifier(auditor).map_err(|source| {
            ValidationError::VerifierResolution {
                role: "auditor",
                identity: auditor.to_string(),
                source,
            }
        })?;
        let signature = ctx
            .signature_provider
            .has_been_signed_by(auditor, verifier.as_ref())?;
        ctx.signatures.push(signature);
    }
    Ok(())
}
