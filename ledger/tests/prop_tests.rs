use std::cell::RefCell;
use std::collections::BTreeMap;

use proptest::prelude::*;

use tessera_ledger::keys::{create_composite_key, split_composite_key, token_key};
use tessera_ledger::{
    Action, IssueAction, Ledger, LedgerError, Metadata, StateReader, TransferAction, Translator,
    TranslatorError,
};
use tessera_types::TokenId;

#[derive(Default)]
struct MemLedger(RefCell<BTreeMap<String, Vec<u8>>>);

impl StateReader for MemLedger {
    fn get_state(&self, _ns: &str, key: &str) -> Result<Vec<u8>, LedgerError> {
        Ok(self.0.borrow().get(key).cloned().unwrap_or_default())
    }
    fn get_state_metadata(&self, _ns: &str, _key: &str) -> Result<Metadata, LedgerError> {
        Ok(Metadata::new())
    }
}

impl Ledger for MemLedger {
    fn set_state(&self, _ns: &str, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.0.borrow_mut().insert(key.to_string(), value.to_vec());
        Ok(())
    }
    fn delete_state(&self, _ns: &str, key: &str) -> Result<(), LedgerError> {
        self.0.borrow_mut().remove(key);
        Ok(())
    }
    fn set_state_metadata(&self, _ns: &str, _key: &str, _m: &Metadata) -> Result<(), LedgerError> {
        Ok(())
    }
}

struct Issue(usize, Metadata);

impl IssueAction for Issue {
    fn num_outputs(&self) -> usize {
        self.0
    }
    fn serialized_outputs(&self) -> Result<Vec<Vec<u8>>, TranslatorError> {
        Ok(vec![vec![1]; self.0])
    }
    fn metadata(&self) -> &Metadata {
        &self.1
    }
}

struct Spend(Vec<TokenId>, Metadata);

impl TransferAction for Spend {
    fn input_ids(&self) -> Vec<TokenId> {
        self.0.clone()
    }
    fn serial_numbers(&self) -> Vec<String> {
        Vec::new()
    }
    fn is_graph_hiding(&self) -> bool {
        false
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn is_redeem_at(&self, _index: usize) -> bool {
        false
    }
    fn serialize_output_at(&self, _index: usize) -> Result<Vec<u8>, TranslatorError> {
        Ok(vec![2])
    }
    fn metadata(&self) -> &Metadata {
        &self.1
    }
}

proptest! {
    /// Issues within one transaction never collide, and replaying the
    /// transaction id is rejected before any write.
    #[test]
    fn issued_keys_are_unique(sizes in prop::collection::vec(1usize..5, 1..6)) {
        let ledger = MemLedger::default();
        let mut t = Translator::new("tx", &ledger, "ns");
        for n in &sizes {
            t.write(Action::Issue(&Issue(*n, Metadata::new()))).unwrap();
        }
        let total: usize = sizes.iter().sum();
        prop_assert_eq!(ledger.0.borrow().len(), total);

        let mut replay = Translator::new("tx", &ledger, "ns");
        let result = replay.write(Action::Issue(&Issue(sizes[0], Metadata::new())));
        prop_assert!(matches!(result, Err(TranslatorError::TokenExists(_))));
        prop_assert_eq!(ledger.0.borrow().len(), total);
    }

    /// A spent input can never be spent again.
    #[test]
    fn inputs_spend_once(n in 1usize..6, pick in 0usize..6) {
        let pick = pick % n;
        let ledger = MemLedger::default();
        Translator::new("mint", &ledger, "ns")
            .write(Action::Issue(&Issue(n, Metadata::new())))
            .unwrap();

        let spend = Spend(vec![TokenId::new("mint", pick as u64)], Metadata::new());
        Translator::new("t1", &ledger, "ns").write(Action::Transfer(&spend)).unwrap();
        let before = ledger.0.borrow().clone();

        let result = Translator::new("t2", &ledger, "ns").write(Action::Transfer(&spend));
        prop_assert!(matches!(result, Err(TranslatorError::AlreadySpent(_))));
        prop_assert_eq!(&*ledger.0.borrow(), &before);
    }

    /// Composite keys split back into their components.
    #[test]
    fn composite_keys_split(
        object in "[a-z]{1,8}",
        attrs in prop::collection::vec("[a-zA-Z0-9._-]{0,10}", 0..4),
    ) {
        let refs: Vec<&str> = attrs.iter().map(String::as_str).collect();
        let key = create_composite_key(&object, &refs).unwrap();
        let (o, a) = split_composite_key(&key).unwrap();
        prop_assert_eq!(o, object);
        prop_assert_eq!(a, attrs);
    }

    /// Token keys of distinct ids differ.
    #[test]
    fn token_keys_injective(
        tx_a in "[a-z0-9]{1,8}",
        tx_b in "[a-z0-9]{1,8}",
        a in any::<u64>(),
        b in any::<u64>(),
    ) {
        prop_assume!((tx_a.as_str(), a) != (tx_b.as_str(), b));
        prop_assert_ne!(token_key(&tx_a, a).unwrap(), token_key(&tx_b, b).unwrap());
    }
}
