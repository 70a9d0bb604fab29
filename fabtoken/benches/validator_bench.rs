use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tessera_core::TokenRequest;
use tessera_fabtoken::{new_validator, IssueAction, PublicParams, TransferAction, TransferInput};
use tessera_identity::TypedDeserializer;
use tessera_ledger::keys::token_key_for;
use tessera_ledger::Ledger;
use tessera_nullables::{sign_request, NullLedger, Signing, TestSigner};
use tessera_types::{Timestamp, Token, TokenId};

fn issue_bench(c: &mut Criterion) {
    let (issuer, alice) = (TestSigner::from_seed(1), TestSigner::from_seed(2));
    let issue = IssueAction::new(
        issuer.identity(),
        vec![Token::new(Some(alice.owner().unwrap()), "USD", "100")],
    );
    let mut request = TokenRequest {
        issues: vec![issue.to_bytes().unwrap()],
        ..TokenRequest::default()
    };
    sign_request(&mut request, "tx1", &[], &[Signing::Plain(&issuer)]).unwrap();
    let raw = request.to_bytes().unwrap();
    let validator = new_validator(
        Arc::new(PublicParams::setup(64).unwrap()),
        Arc::new(TypedDeserializer::default()),
    );
    let ledger = NullLedger::new();

    c.bench_function("validate_issue_1_output", |b| {
        b.iter(|| {
            validator.verify_token_request_from_raw(
                &ledger,
                "ns",
                "tx1",
                black_box(&raw),
                Timestamp::new(0),
            )
        })
    });
}

fn transfer_bench(c: &mut Criterion) {
    let (alice, bob) = (TestSigner::from_seed(2), TestSigner::from_seed(3));
    let ledger = NullLedger::new();
    let inputs: Vec<_> = (0..4)
        .map(|i| TransferInput {
            id: TokenId::new("tx0", i),
            input: Token::new(Some(alice.owner().unwrap()), "USD", "25"),
        })
        .collect();
    for input in &inputs {
        let key = token_key_for(&input.id).unwrap();
        ledger
            .set_state("ns", &key, &bincode::serialize(&input.input).unwrap())
            .unwrap();
    }
    let transfer =
        TransferAction::new(inputs, vec![Token::new(Some(bob.owner().unwrap()), "USD", "100")]);
    let mut request = TokenRequest {
        transfers: vec![transfer.to_bytes().unwrap()],
        ..TokenRequest::default()
    };
    let signers: Vec<_> = (0..4).map(|_| Signing::Plain(&alice)).collect();
    sign_request(&mut request, "tx1", &[], &signers).unwrap();
    let raw = request.to_bytes().unwrap();
    let validator = new_validator(
        Arc::new(PublicParams::setup(64).unwrap()),
        Arc::new(TypedDeserializer::default()),
    );

    c.bench_function("validate_transfer_4_inputs", |b| {
        b.iter(|| {
            validator.verify_token_request_from_raw(
                &ledger,
                "ns",
                "tx1",
                black_box(&raw),
                Timestamp::new(0),
            )
        })
    });
}

criterion_group!(benches, issue_bench, transfer_bench);
criterion_main!(benches);
