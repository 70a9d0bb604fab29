use tessera_core::{PublicParameters, ValidationError};
use tessera_identity::htlc::{metadata_claim_key_check, metadata_lock_key_check, verify_owner};
use tessera_identity::{Owner, OwnerKind, Script, TypedIdentity};
use tessera_types::Identity;

use super::Context;
use crate::actions::TransferAction;

/// The script behind `owner`, or `None` when it is not an HTLC.
fn htlc_script(owner: &Identity) -> Result<Option<Script>, ValidationError> {
    let typed = TypedIdentity::from_identity(owner).map_err(ValidationError::Script)?;
    if typed.identity_type != OwnerKind::Htlc.tag() {
        return Ok(None);
    }
    let owner = Owner::decode(owner).map_err(ValidationError::Script)?;
    Ok(owner.as_htlc().cloned())
}

/// Spending an HTLC input moves the whole token to exactly one output:
/// the recipient before the deadline (claim, with the preimage published
/// under the claim key) or the sender from the deadline on (reclaim).
/// Locking an output requires a live script and the lock key.
pub fn transfer_htlc_validate(
    ctx: &mut Context<'_, TransferAction>,
) -> Result<(), ValidationError> {
    let action = ctx.action;
    let precision = ctx.pp.precision();
    let mut counted = Vec::new();

    for (i, input) in ctx.input_tokens.iter().enumerate() {
        let Some(input_owner) = input.owner.as_ref() else {
            continue;
        };
        if htlc_script(input_owner)?.is_none() {
            continue;
        }

        let [output] = action.outputs.as_slice() else {
            return Err(ValidationError::Htlc(
                "an htlc script only transfers the ownership of a token".into(),
            ));
        };
        if output.token_type != input.token_type {
            return Err(ValidationError::Htlc(
                "type of input does not match type of output".into(),
            ));
        }
        if output.quantity(precision)? != input.quantity(precision)? {
            return Err(ValidationError::Htlc(
                "quantity of input does not match quantity of output".into(),
            ));
        }
        let Some(output_owner) = output.owner.as_ref() else {
            return Err(ValidationError::Htlc(
                "the output of a transfer action referencing an htlc script cannot be a redeem"
                    .into(),
            ));
        };

        let (script, op) =
            verify_owner(input_owner, output_owner, ctx.now).map_err(ValidationError::Script)?;
        let signature = ctx.signatures.get(i).ok_or(ValidationError::InsufficientSignatures)?;
        tracing::trace!(input = i, operation = ?op, "htlc spend");
        if let Some(key) = metadata_claim_key_check(&action.metadata, &script, op, signature)
            .map_err(ValidationError::Script)?
        {
            counted.push(key);
        }
    }

    for output in &action.outputs {
        let Some(owner) = output.owner.as_ref() else {
            continue;
        };
        let Some(script) = htlc_script(owner)? else {
            continue;
        };
        script.validate(ctx.now).map_err(ValidationError::Script)?;
        let key = metadata_lock_key_check(&action.metadata, &script)
            .map_err(ValidationError::Script)?;
        counted.push(key);
    }

    for key in counted {
        ctx.count_metadata_key(key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TransferInput;
    use crate::validator::test_support::Harness;
    use tessera_identity::htlc::{claim_key, lock_key, lock_value};
    use tessera_identity::{IdentityError, Owner};
    use tessera_ledger::Metadata;
    use tessera_nullables::{sha256_script, TestSigner};
    use tessera_types::{Timestamp, Token, TokenId};

    const PREIMAGE: &[u8] = b"open sesame";

    struct Parties {
        alice: TestSigner,
        bob: TestSigner,
        script: Script,
    }

    fn parties(deadline: u64) -> Parties {
        let alice = TestSigner::from_seed(1);
        let bob = TestSigner::from_seed(2);
        let script = sha256_script(&alice, &bob, PREIMAGE, Timestamp::new(deadline)).unwrap();
        Parties { alice, bob, script }
    }

    fn locked_input(script: &Script) -> TransferInput {
        TransferInput {
            id: TokenId::new("tx0", 0),
            input: Token::new(Some(Owner::Htlc(script.clone()).encode().unwrap()), "USD", "10"),
        }
    }

    fn claim_metadata(script: &Script) -> Metadata {
        Metadata::from([(claim_key(&script.hash_info.image(PREIMAGE)), PREIMAGE.to_vec())])
    }

    fn check(
        h: &mut Harness,
        action: &TransferAction,
        signature: Vec<u8>,
    ) -> Result<Vec<(String, usize)>, ValidationError> {
        let mut ctx = h.context(action);
        ctx.input_tokens = action.inputs.iter().map(|i| i.input.clone()).collect();
        ctx.signatures = vec![signature];
        transfer_htlc_validate(&mut ctx)?;
        Ok(ctx.metadata_counter.into_iter().collect())
    }

    #[test]
    fn claim_before_deadline_counts_claim_key() {
        let p = parties(2_000);
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(Some(p.bob.owner().unwrap()), "USD", "10")],
        )
        .with_metadata(claim_metadata(&p.script));
        let counted = check(&mut h, &action, p.bob.claim(b"m", PREIMAGE).unwrap()).unwrap();
        assert_eq!(counted, vec![(claim_key(&p.script.hash_info.hash), 1)]);
    }

    #[test]
    fn claim_without_published_preimage_fails() {
        let p = parties(2_000);
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(Some(p.bob.owner().unwrap()), "USD", "10")],
        );
        assert!(matches!(
            check(&mut h, &action, p.bob.claim(b"m", PREIMAGE).unwrap()),
            Err(ValidationError::Script(IdentityError::MissingMetadata { kind: "claim", .. }))
        ));
    }

    #[test]
    fn reclaim_after_deadline_counts_nothing() {
        let p = parties(500);
        let mut h = Harness::new();
        let action = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(Some(p.alice.owner().unwrap()), "USD", "10")],
        );
        let counted = check(&mut h, &action, p.alice.reclaim(b"m").unwrap()).unwrap();
        assert!(counted.is_empty());
    }

    #[test]
    fn deadline_decides_who_may_receive() {
        let p = parties(1_000);
        let mut h = Harness::new();
        // now == deadline: the sender's turn
        let action = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(Some(p.bob.owner().unwrap()), "USD", "10")],
        )
        .with_metadata(claim_metadata(&p.script));
        assert!(matches!(
            check(&mut h, &action, p.bob.claim(b"m", PREIMAGE).unwrap()),
            Err(ValidationError::Script(IdentityError::OwnerMismatch { expected: "sender" }))
        ));

        h.now = Timestamp::new(999);
        let action = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(Some(p.alice.owner().unwrap()), "USD", "10")],
        );
        assert!(matches!(
            check(&mut h, &action, p.alice.reclaim(b"m").unwrap()),
            Err(ValidationError::Script(IdentityError::OwnerMismatch { expected: "recipient" }))
        ));
    }

    #[test]
    fn htlc_input_moves_whole_token_to_one_output() {
        let p = parties(2_000);
        let mut h = Harness::new();
        let bob = p.bob.owner().unwrap();
        let split = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![
                Token::new(Some(bob.clone()), "USD", "5"),
                Token::new(Some(bob.clone()), "USD", "5"),
            ],
        );
        assert!(matches!(
            check(&mut h, &split, vec![]),
            Err(ValidationError::Htlc(_))
        ));

        let partial = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(Some(bob), "USD", "9")],
        );
        assert!(matches!(
            check(&mut h, &partial, vec![]),
            Err(ValidationError::Htlc(msg)) if msg.contains("quantity")
        ));

        let redeem = TransferAction::new(
            vec![locked_input(&p.script)],
            vec![Token::new(None, "USD", "10")],
        );
        assert!(matches!(
            check(&mut h, &redeem, vec![]),
            Err(ValidationError::Htlc(msg)) if msg.contains("redeem")
        ));
    }

    #[test]
    fn locking_output_needs_lock_key_and_live_script() {
        let p = parties(2_000);
        let mut h = Harness::new();
        let plain_input = TransferInput {
            id: TokenId::new("tx0", 0),
            input: Token::new(Some(p.alice.owner().unwrap()), "USD", "10"),
        };
        let locked = Owner::Htlc(p.script.clone()).encode().unwrap();
        let action = TransferAction::new(
            vec![plain_input.clone()],
            vec![Token::new(Some(locked.clone()), "USD", "10")],
        );
        assert!(matches!(
            check(&mut h, &action, vec![]),
            Err(ValidationError::Script(IdentityError::MissingMetadata { kind: "lock", .. }))
        ));

        let hash = &p.script.hash_info.hash;
        let action = action.with_metadata(Metadata::from([(lock_key(hash), lock_value(hash))]));
        assert_eq!(
            check(&mut h, &action, vec![]).unwrap(),
            vec![(lock_key(hash), 1)]
        );

        h.now = Timestamp::new(2_000);
        assert!(matches!(
            check(&mut h, &action, vec![]),
            Err(ValidationError::Script(IdentityError::ScriptExpired { .. }))
        ));
    }
}
