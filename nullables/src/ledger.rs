//! Nullable ledger: an in-memory key-value store with failure injection.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tessera_ledger::{Ledger, LedgerError, Metadata, StateReader};

type Key = (String, String);

/// One mutation, recorded in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerWrite {
    Set { namespace: String, key: String },
    Delete { namespace: String, key: String },
    SetMetadata { namespace: String, key: String },
}

#[derive(Default)]
struct Failures {
    reads: bool,
    /// Writes still allowed before every further write fails.
    writes_left: Option<usize>,
}

/// Thread-safe so a single handle can back a validator and a translator.
#[derive(Default)]
pub struct NullLedger {
    state: Mutex<BTreeMap<Key, Vec<u8>>>,
    metadata: Mutex<BTreeMap<Key, Metadata>>,
    journal: Mutex<Vec<LedgerWrite>>,
    failures: Mutex<Failures>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, LedgerError> {
    mutex
        .lock()
        .map_err(|_| LedgerError::Unavailable("null ledger lock poisoned".into()))
}

fn key(namespace: &str, key: &str) -> Key {
    (namespace.to_string(), key.to_string())
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail until reset.
    pub fn fail_reads(&self, fail: bool) -> Result<(), LedgerError> {
        lock(&self.failures)?.reads = fail;
        Ok(())
    }

    /// Allow `n` more writes, then fail every write after them.
    pub fn fail_writes_after(&self, n: usize) -> Result<(), LedgerError> {
        lock(&self.failures)?.writes_left = Some(n);
        Ok(())
    }

    pub fn clear_failures(&self) -> Result<(), LedgerError> {
        *lock(&self.failures)? = Failures::default();
        Ok(())
    }

    /// Keys of `namespace` currently holding a non-empty value.
    pub fn keys(&self, namespace: &str) -> Result<Vec<String>, LedgerError> {
        Ok(lock(&self.state)?
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, k)| k.clone())
            .collect())
    }

    pub fn journal(&self) -> Result<Vec<LedgerWrite>, LedgerError> {
        Ok(lock(&self.journal)?.clone())
    }

    fn check_read(&self) -> Result<(), LedgerError> {
        if lock(&self.failures)?.reads {
            return Err(LedgerError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    fn record(&self, write: LedgerWrite) -> Result<(), LedgerError> {
        {
            let mut failures = lock(&self.failures)?;
            match failures.writes_left {
                Some(0) => return Err(LedgerError::Backend("injected write failure".into())),
                Some(ref mut n) => *n -= 1,
                None => {}
            }
        }
        lock(&self.journal)?.push(write);
        Ok(())
    }
}

impl StateReader for NullLedger {
    fn get_state(&self, namespace: &str, k: &str) -> Result<Vec<u8>, LedgerError> {
        self.check_read()?;
        Ok(lock(&self.state)?
            .get(&key(namespace, k))
            .cloned()
            .unwrap_or_default())
    }

    fn get_state_metadata(&self, namespace: &str, k: &str) -> Result<Metadata, LedgerError> {
        self.check_read()?;
        Ok(lock(&self.metadata)?
            .get(&key(namespace, k))
            .cloned()
            .unwrap_or_default())
    }
}

impl Ledger for NullLedger {
    fn set_state(&self, namespace: &str, k: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.record(LedgerWrite::Set {
            namespace: namespace.to_string(),
            key: k.to_string(),
        })?;
        let mut state = lock(&self.state)?;
        if value.is_empty() {
            state.remove(&key(namespace, k));
        } else {
            state.insert(key(namespace, k), value.to_vec());
        }
        Ok(())
    }

    fn delete_state(&self, namespace: &str, k: &str) -> Result<(), LedgerError> {
        self.record(LedgerWrite::Delete {
            namespace: namespace.to_string(),
            key: k.to_string(),
        })?;
        lock(&self.state)?.remove(&key(namespace, k));
        lock(&self.metadata)?.remove(&key(namespace, k));
        Ok(())
    }

    fn set_state_metadata(
        &self,
        namespace: &str,
        k: &str,
        metadata: &Metadata,
    ) -> Result<(), LedgerError> {
        self.record(LedgerWrite::SetMetadata {
            namespace: namespace.to_string(),
            key: k.to_string(),
        })?;
        lock(&self.metadata)?.insert(key(namespace, k), metadata.clone());
        Ok(())
    }
}
