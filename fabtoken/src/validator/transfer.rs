use tessera_core::{PublicParameters, ValidationError};
use tessera_ledger::keys::token_key_for;
use tessera_types::Quantity;

use super::{count_application_data, Context};
use crate::actions::TransferAction;

pub fn transfer_action_validate(
    ctx: &mut Context<'_, TransferAction>,
) -> Result<(), ValidationError> {
    ctx.action.validate()
}

/// Every input exists on the ledger, unspent, exactly as declared.
pub fn transfer_inputs_validate(
    ctx: &mut Context<'_, TransferAction>,
) -> Result<(), ValidationError> {
    for input in &ctx.action.inputs {
        let key = token_key_for(&input.id)
            .map_err(|e| ValidationError::InvalidAction(format!("input {}: {e}", input.id)))?;
        let stored = ctx
            .ledger
            .get_state(ctx.namespace, &key)
            .map_err(|source| ValidationError::Ledger {
                key: key.escape_default().to_string(),
                source,
            })?;
        if stored.is_empty() {
            return Err(ValidationError::UnknownInput(input.id.to_string()));
        }
        let declared = bincode::serialize(&input.input)
            .map_err(|e| ValidationError::MalformedAction(e.to_string()))?;
        if stored != declared {
            return Err(ValidationError::InputMismatch(input.id.to_string()));
        }
    }
    Ok(())
}

/// Every input owner signed the request; so did the issuer on a redeem.
///
/// Records the inputs and their signatures, in input order, for the
/// checks that follow.
pub fn transfer_signature_validate(
    ctx: &mut Context<'_, TransferAction>,
) -> Result<(), ValidationError> {
    let action = ctx.action;
    if action.inputs.is_empty() {
        return Err(ValidationError::NoInputs);
    }
    for input in &action.inputs {
        let owner = input.input.owner.as_ref().ok_or_else(|| {
            ValidationError::InvalidAction(format!("input {} has no owner", input.id))
        })?;
        let verifier = ctx.deserializer.owner_verifier(owner).map_err(|source| {
            ValidationError::VerifierResolution {
                role: "owner",
                identity: owner.to_string(),
                source,
            }
        })?;
        let signature = ctx
            .signature_provider
            .has_been_signed_by(owner, verifier.as_ref())?;
        tracing::trace!(input = %input.id, owner = %owner.unique_id(), "owner signature verified");
        ctx.input_tokens.push(input.input.clone());
        ctx.signatures.push(signature);
    }

    if action.is_redeem() {
        // Any issuer may sign a redeem; the issuer list only gates issuance.
        let issuer = action.issuer.as_ref().ok_or(ValidationError::NoIssuerOnRedeem)?;
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
        ctx.signatures.push(signature);
    }
    Ok(())
}

/// One token type throughout, and the input sum equals the output sum.
pub fn transfer_balance_validate(
    ctx: &mut Context<'_, TransferAction>,
) -> Result<(), ValidationError> {
    let action = ctx.action;
    if action.outputs.is_empty() {
        return Err(ValidationError::NoOutputs);
    }
    let first = ctx.input_tokens.first().ok_or(ValidationError::NoInputs)?;
    let token_type = first.token_type.as_str();
    let precision = ctx.pp.precision();

    let mut input_sum = Quantity::zero(precision)?;
    for input in &ctx.input_tokens {
        if input.token_type != token_type {
            return Err(ValidationError::InputTypeMismatch {
                input: input.token_type.clone(),
                expected: token_type.to_string(),
            });
        }
        input_sum = input_sum.checked_add(&input.quantity(precision)?)?;
    }

    let mut output_sum = Quantity::zero(precision)?;
    for output in &action.outputs {
        if output.token_type != token_type {
            return Err(ValidationError::OutputTypeMismatch {
                output: output.token_type.clone(),
                expected: token_type.to_string(),
            });
        }
        output_sum = output_sum.checked_add(&output.quantity(precision)?)?;
    }

    if input_sum != output_sum {
        return Err(ValidationError::Unbalanced {
            inputs: input_sum.to_decimal(),
            outputs: output_sum.to_decimal(),
        });
    }
    Ok(())
}

pub fn transfer_application_data_validate(
    ctx: &mut Context<'_, TransferAction>,
) -> Result<(), ValidationError> {
    let action = ctx.action;
    count_application_data(ctx, &action.metadata);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TransferInput;
    use crate::validator::test_support::Harness;
    use tessera_ledger::Ledger;
    use tessera_nullables::{NullSignatureProvider, TestSigner};
    use tessera_types::{Identity, Token, TokenId};

    fn owner(seed: u8) -> Identity {
        TestSigner::from_seed(seed).owner().unwrap()
    }

    fn input(idx: u64, token_type: &str, qty: &str) -> TransferInput {
        TransferInput {
            id: TokenId::new("tx0", idx),
            input: Token::new(Some(owner(1)), token_type, qty),
        }
    }

    fn run_balance(h: &mut Harness, action: &TransferAction) -> Result<(), ValidationError> {
        let mut ctx = h.context(action);
        transfer_signature_validate(&mut ctx)?;
        transfer_balance_validate(&mut ctx)
    }

    #[test]
    fn balanced_transfer_passes() {
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![input(0, "USD", "60"), input(1, "USD", "0x28")],
            vec![Token::new(Some(owner(2)), "USD", "70"), Token::new(Some(owner(1)), "USD", "30")],
        );
        assert!(run_balance(&mut h, &action).is_ok());
    }

    #[test]
    fn unbalanced_transfer_reports_sums() {
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![input(0, "USD", "100")],
            vec![Token::new(Some(owner(2)), "USD", "101")],
        );
        match run_balance(&mut h, &action) {
            Err(ValidationError::Unbalanced { inputs, outputs }) => {
                assert_eq!(inputs, "100");
                assert_eq!(outputs, "101");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn mixed_types_are_rejected() {
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![input(0, "USD", "10"), input(1, "EUR", "10")],
            vec![Token::new(Some(owner(2)), "USD", "20")],
        );
        assert!(matches!(
            run_balance(&mut h, &action),
            Err(ValidationError::InputTypeMismatch { .. })
        ));

        let action = TransferAction::new(
            vec![input(0, "USD", "10")],
            vec![Token::new(Some(owner(2)), "EUR", "10")],
        );
        assert!(matches!(
            run_balance(&mut h, &action),
            Err(ValidationError::OutputTypeMismatch { .. })
        ));
    }

    #[test]
    fn redeem_requires_issuer() {
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![input(0, "USD", "10")],
            vec![Token::new(None, "USD", "10")],
        );
        assert!(matches!(
            transfer_signature_validate(&mut h.context(&action)),
            Err(ValidationError::NoIssuerOnRedeem)
        ));

        let issuer = TestSigner::from_seed(9).identity();
        let action = action.with_issuer(issuer.clone());
        let mut ctx = h.context(&action);
        transfer_signature_validate(&mut ctx).unwrap();
        assert_eq!(ctx.signatures.len(), 2);
        drop(ctx);
        assert_eq!(h.provider.requested().last(), Some(&issuer));
    }

    #[test]
    fn redeem_by_unlisted_issuer_is_accepted() {
        let mut h = Harness::new();
        h.pp.add_issuer(TestSigner::from_seed(8).identity());
        let unlisted = TestSigner::from_seed(9).identity();
        let action = TransferAction::new(
            vec![input(0, "USD", "10")],
            vec![Token::new(None, "USD", "10")],
        )
        .with_issuer(unlisted.clone());
        let mut ctx = h.context(&action);
        transfer_signature_validate(&mut ctx).unwrap();
        assert_eq!(ctx.signatures.len(), 2);
        drop(ctx);
        assert_eq!(h.provider.requested().last(), Some(&unlisted));
    }

    #[test]
    fn missing_owner_signature_is_reported() {
        let mut h = Harness::new();
        h.provider = NullSignatureProvider::with_signatures(vec![vec![1]]);
        let action = TransferAction::new(
            vec![input(0, "USD", "10"), input(1, "USD", "10")],
            vec![Token::new(Some(owner(2)), "USD", "20")],
        );
        assert!(matches!(
            transfer_signature_validate(&mut h.context(&action)),
            Err(ValidationError::InsufficientSignatures)
        ));
    }

    #[test]
    fn balance_needs_recorded_inputs() {
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![input(0, "USD", "10")],
            vec![Token::new(Some(owner(2)), "USD", "10")],
        );
        assert!(matches!(
            transfer_balance_validate(&mut h.context(&action)),
            Err(ValidationError::NoInputs)
        ));
    }

    #[test]
    fn inputs_must_match_the_ledger() {
        let mut h = Harness::new();
        let declared = input(0, "USD", "10");
        let action = TransferAction::new(
            vec![declared.clone()],
            vec![Token::new(Some(owner(2)), "USD", "10")],
        );
        assert!(matches!(
            transfer_inputs_validate(&mut h.context(&action)),
            Err(ValidationError::UnknownInput(_))
        ));

        let key = token_key_for(&declared.id).unwrap();
        let stored = Token::new(Some(owner(1)), "USD", "1");
        h.ledger
            .set_state("ns", &key, &bincode::serialize(&stored).unwrap())
            .unwrap();
        assert!(matches!(
            transfer_inputs_validate(&mut h.context(&action)),
            Err(ValidationError::InputMismatch(_))
        ));

        h.ledger
            .set_state("ns", &key, &bincode::serialize(&declared.input).unwrap())
            .unwrap();
        assert!(transfer_inputs_validate(&mut h.context(&action)).is_ok());
    }

    #[test]
    fn ledger_failure_is_reported() {
        let mut h = Harness::new();
        h.ledger.fail_reads(true).unwrap();
        let action = TransferAction::new(
            vec![input(0, "USD", "10")],
            vec![Token::new(Some(owner(2)), "USD", "10")],
        );
        assert!(matches!(
            transfer_inputs_validate(&mut h.context(&action)),
            Err(ValidationError::Ledger { .. })
        ));
    }

    #[test]
    fn application_data_counts_public_keys_only() {
        let mut h = Harness::new();
        let action = TransferAction::new(vec![input(0, "USD", "1")], vec![])
            .with_metadata(tessera_ledger::Metadata::from([
                ("pub.a".to_string(), vec![1]),
                ("htlc.lk.00".to_string(), vec![1]),
            ]));
        let mut ctx = h.context(&action);
        transfer_application_data_validate(&mut ctx).unwrap();
        assert_eq!(ctx.metadata_counter.len(), 1);
        assert_eq!(ctx.metadata_counter.get("pub.a"), Some(&1));
    }
}
