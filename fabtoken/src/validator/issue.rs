use tessera_core::{PublicParameters, ValidationError};
use tessera_types::Quantity;

use super::{count_application_data, Context};
use crate::actions::IssueAction;

pub fn issue_action_validate(ctx: &mut Context<'_, IssueAction>) -> Result<(), ValidationError> {
    ctx.action.validate()
}

/// Every output quantity parses under the precision and is not zero.
pub fn issue_quantities_validate(
    ctx: &mut Context<'_, IssueAction>,
) -> Result<(), ValidationError> {
    let precision = ctx.pp.precision();
    for output in &ctx.action.outputs {
        if Quantity::parse(&output.quantity, precision)?.is_zero() {
            return Err(ValidationError::ZeroQuantity);
        }
    }
    Ok(())
}

/// With a non-empty issuer list, only listed issuers may issue.
pub fn issue_issuer_validate(ctx: &mut Context<'_, IssueAction>) -> Result<(), ValidationError> {
    let issuers = ctx.pp.issuers();
    if !issuers.is_empty() && !issuers.contains(&ctx.action.issuer) {
        return Err(ValidationError::IssuerNotAuthorized(ctx.action.issuer.to_string()));
    }
    Ok(())
}

pub fn issue_signature_validate(ctx: &mut Context<'_, IssueAction>) -> Result<(), ValidationError> {
    let issuer = &ctx.action.issuer;
    let verifier = ctx.deserializer.issuer_verifier(issuer).map_err(|source| {
        ValidationError::VerifierResolution {
            role: "issuer",
            identity: issuer.to_string(),
            source,
        }
    })?;
    let signature = ctx
        .signature_provider
        .has_been_signed_by(issuer, verifier.as_ref())?;
    tracing::trace!(issuer = %issuer.unique_id(), "issuer signature verified");
    ctx.signatures.push(signature);
    Ok(())
}

pub fn issue_application_data_validate(
    ctx: &mut Context<'_, IssueAction>,
) -> Result<(), ValidationError> {
    let action = ctx.action;
    count_application_data(ctx, &action.metadata);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::test_support::Harness;
    use tessera_nullables::TestSigner;
    use tessera_types::{Identity, QuantityError, Token};

    fn issue(issuer: Identity, qty: &str) -> IssueAction {
        IssueAction::new(
            issuer,
            vec![Token::new(Some(Identity::new(vec![7; 8])), "USD", qty)],
        )
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut h = Harness::new();
        let action = issue(Identity::new(vec![1]), "0");
        assert!(matches!(
            issue_quantities_validate(&mut h.context(&action)),
            Err(ValidationError::ZeroQuantity)
        ));
    }

    #[test]
    fn quantity_must_fit_precision() {
        let mut h = Harness::new();
        h.pp = crate::PublicParams::setup(8).unwrap();
        let action = issue(Identity::new(vec![1]), "256");
        assert!(matches!(
            issue_quantities_validate(&mut h.context(&action)),
            Err(ValidationError::Quantity(QuantityError::PrecisionExceeded { .. }))
        ));
        let action = issue(Identity::new(vec![1]), "0xff");
        assert!(issue_quantities_validate(&mut h.context(&action)).is_ok());
    }

    #[test]
    fn unlisted_issuer_is_rejected() {
        let mut h = Harness::new();
        h.pp.add_issuer(Identity::new(vec![1]));
        let action = issue(Identity::new(vec![2]), "1");
        assert!(matches!(
            issue_issuer_validate(&mut h.context(&action)),
            Err(ValidationError::IssuerNotAuthorized(_))
        ));
        let action = issue(Identity::new(vec![1]), "1");
        assert!(issue_issuer_validate(&mut h.context(&action)).is_ok());
    }

    #[test]
    fn empty_issuer_list_allows_anyone() {
        let mut h = Harness::new();
        let action = issue(Identity::new(vec![42]), "1");
        assert!(issue_issuer_validate(&mut h.context(&action)).is_ok());
    }

    #[test]
    fn issuer_signature_is_requested_from_issuer() {
        let mut h = Harness::new();
        let issuer = TestSigner::from_seed(1).identity();
        let action = issue(issuer.clone(), "1");
        let mut ctx = h.context(&action);
        issue_signature_validate(&mut ctx).unwrap();
        assert_eq!(ctx.signatures.len(), 1);
        drop(ctx);
        assert_eq!(h.provider.requested(), &[issuer]);
    }

    #[test]
    fn issuer_must_be_a_raw_key() {
        let mut h = Harness::new();
        let action = issue(Identity::new(vec![1, 2, 3]), "1");
        assert!(matches!(
            issue_signature_validate(&mut h.context(&action)),
            Err(ValidationError::VerifierResolution { role: "issuer", .. })
        ));
    }
}
