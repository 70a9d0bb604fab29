//! The request pipeline of one token management scope.

use std::sync::Arc;

use tessera_core::{DriverRegistry, PublicParameters, TokenRequestValidator};
use tessera_ledger::{Action, Ledger, SetupAction, StateReader, Translator, TranslatorError};
use tessera_types::{Timestamp, TokenId};

use crate::config::{TmsConfig, TmsId};
use crate::TmsError;

/// What an accepted request wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub tx_id: String,
    pub issues: usize,
    pub transfers: usize,
    /// Outputs written, which is also the next free output index.
    pub outputs_written: u64,
    /// Ledger keys of the spent inputs.
    pub spent: Vec<String>,
    /// SHA-256 of the request when only the digest was stored.
    pub request_hash: Option<Vec<u8>>,
}

struct RawSetup<'a>(&'a [u8]);

impl SetupAction for RawSetup<'_> {
    fn public_parameters(&self) -> Result<Vec<u8>, TranslatorError> {
        Ok(self.0.to_vec())
    }
}

pub struct TokenManagementScope {
    config: TmsConfig,
    registry: DriverRegistry,
}

impl TokenManagementScope {
    /// Fails unless the configuration is valid and the registry knows the
    /// configured driver.
    pub fn new(config: TmsConfig, registry: DriverRegistry) -> Result<Self, TmsError> {
        config.validate()?;
        registry.driver(&config.driver)?;
        tracing::debug!(
            tms = %config.tms_id(),
            driver = %config.driver,
            "token management scope ready"
        );
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &TmsConfig {
        &self.config
    }

    pub fn tms_id(&self) -> TmsId {
        self.config.tms_id()
    }

    /// Install or replace the scope's public parameters in transaction
    /// `anchor`.
    pub fn setup<L: Ledger>(
        &self,
        ledger: &L,
        anchor: &str,
        pp: &dyn PublicParameters,
    ) -> Result<(), TmsError> {
        pp.validate()?;
        self.check_driver(pp)?;
        let raw = pp.to_bytes()?;
        // The registered driver must accept what it will later be handed.
        self.registry.public_params_from_bytes(&raw)?;

        let mut translator = Translator::new(anchor, ledger, self.config.namespace.as_str());
        translator.write(Action::Setup(&RawSetup(&raw)))?;
        tracing::info!(
            tms = %self.tms_id(),
            anchor,
            identifier = %pp.identifier(),
            "public parameters installed"
        );
        Ok(())
    }

    /// The parameters currently installed in the ledger.
    pub fn public_params<L: Ledger>(
        &self,
        ledger: &L,
    ) -> Result<Arc<dyn PublicParameters>, TmsError> {
        let raw = self.read_setup(ledger)?;
        let pp = self.registry.public_params_from_bytes(&raw)?;
        self.check_driver(pp.as_ref())?;
        Ok(pp)
    }

    /// A validator for the parameters currently installed in the ledger.
    pub fn validator<L: Ledger>(
        &self,
        ledger: &L,
    ) -> Result<Box<dyn TokenRequestValidator>, TmsError> {
        let raw = self.read_setup(ledger)?;
        let validator = self.registry.new_validator(&raw)?;
        self.check_driver(validator.public_params().as_ref())?;
        Ok(validator)
    }

    /// Validate `raw_request` bound to transaction `anchor` and, if it is
    /// accepted, write its actions (issues first, then transfers) and the
    /// request itself.
    ///
    /// Validation reads the ledger only; writes start once the whole request
    /// is accepted. Each action is checked before it is committed, but a
    /// failure on a later action leaves earlier ones written, so the caller
    /// must abort the enclosing transaction on error.
    pub fn process<L: Ledger>(
        &self,
        ledger: &L,
        anchor: &str,
        raw_request: &[u8],
        now: Timestamp,
    ) -> Result<ProcessOutcome, TmsError> {
        let validator = self.validator(ledger)?;

        let mut translator = Translator::new(anchor, ledger, self.config.namespace.as_str())
            .with_issued_history(self.config.record_issued_history);
        if !translator.read_token_request()?.is_empty() {
            return Err(TranslatorError::DuplicateTokenRequest(anchor.to_string()).into());
        }

        let reader: &dyn StateReader = ledger;
        let actions = validator
            .verify_token_request_from_raw(reader, &self.config.namespace, anchor, raw_request, now)
            .map_err(|e| {
                tracing::debug!(tms = %self.tms_id(), anchor, error = %e, "token request rejected");
                e
            })?;

        let (mut issues, mut transfers) = (0, 0);
        for action in &actions {
            match action.as_action() {
                Action::Issue(_) => issues += 1,
                Action::Transfer(_) => transfers += 1,
                Action::Setup(_) => {}
            }
            translator.write(action.as_action())?;
        }
        let request_hash =
            translator.commit_token_request(raw_request, self.config.store_token_request_hash)?;

        tracing::info!(
            tms = %self.tms_id(),
            anchor,
            issues,
            transfers,
            outputs = translator.counter(),
            "token request committed"
        );
        Ok(ProcessOutcome {
            tx_id: anchor.to_string(),
            issues,
            transfers,
            outputs_written: translator.counter(),
            spent: translator.spent_ids().to_vec(),
            request_hash,
        })
    }

    /// Serialized outputs for `ids`; every missing id is reported.
    pub fn query_tokens<L: Ledger>(
        &self,
        ledger: &L,
        ids: &[TokenId],
    ) -> Result<Vec<Vec<u8>>, TmsError> {
        Ok(self.reader(ledger).query_tokens(ids)?)
    }

    /// Whether each id is spent, interpreting ids as the installed
    /// parameters require: serial numbers when the graph is hidden,
    /// token keys otherwise.
    pub fn are_tokens_spent<L: Ledger>(
        &self,
        ledger: &L,
        ids: &[String],
    ) -> Result<Vec<bool>, TmsError> {
        let graph_hiding = self.public_params(ledger)?.graph_hiding();
        Ok(self.reader(ledger).are_tokens_spent(ids, graph_hiding)?)
    }

    /// The stored token request of transaction `anchor`, or its digest.
    pub fn token_request<L: Ledger>(&self, ledger: &L, anchor: &str) -> Result<Vec<u8>, TmsError> {
        Ok(Translator::new(anchor, ledger, self.config.namespace.as_str()).read_token_request()?)
    }

    fn reader<'a, L: Ledger>(&self, ledger: &'a L) -> Translator<'a, L> {
        Translator::new("", ledger, self.config.namespace.as_str())
    }

    fn read_setup<L: Ledger>(&self, ledger: &L) -> Result<Vec<u8>, TmsError> {
        let raw = self.reader(ledger).read_setup_parameters()?;
        if raw.is_empty() {
            return Err(TmsError::NotSetUp(self.config.namespace.clone()));
        }
        Ok(raw)
    }

    fn check_driver(&self, pp: &dyn PublicParameters) -> Result<(), TmsError> {
        let actual = pp.identifier();
        if actual != self.config.driver {
            return Err(TmsError::DriverMismatch {
                expected: self.config.driver.clone(),
                actual,
            });
        }
        Ok(())
    }
}
