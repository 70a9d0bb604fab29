//! Error types for validation, public parameters and drivers.

use tessera_identity::IdentityError;
use tessera_ledger::LedgerError;
use tessera_types::QuantityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublicParamsError {
    #[error("invalid precision [{0}], must be larger than 0 and at most 64")]
    InvalidPrecision(u64),

    #[error("max token value is invalid [{max_token}] != [{expected}]")]
    InvalidMaxToken { max_token: u64, expected: u64 },

    #[error("invalid identifier, expecting [{expected}], got [{actual}]")]
    LabelMismatch { expected: String, actual: String },

    #[error("malformed public parameters: {0}")]
    Malformed(String),

    #[error("no auditors provided")]
    NoAuditors,

    #[error("{0} is not supported")]
    NotSupported(&'static str),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to validate rule [{rule}]: {source}")]
    Rule {
        rule: &'static str,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("malformed token request: {0}")]
    MalformedRequest(String),

    #[error("malformed action: {0}")]
    MalformedAction(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error("quantity is zero")]
    ZeroQuantity,

    #[error("issuer [{0}] is not authorized")]
    IssuerNotAuthorized(String),

    #[error("failed getting verifier for {role} identity [{identity}]: {source}")]
    VerifierResolution {
        role: &'static str,
        identity: String,
        #[source]
        source: IdentityError,
    },

    #[error("failed verifying signature of [{identity}]: {source}")]
    SignatureVerification {
        identity: String,
        #[source]
        source: IdentityError,
    },

    #[error("insufficient number of signatures")]
    InsufficientSignatures,

    #[error("{0} signatures were not consumed by validation")]
    UnusedSignatures(usize),

    #[error("expected {expected} auditor signatures, got {actual}")]
    AuditorSignatureCount { expected: usize, actual: usize },

    #[error("auditor signatures are present but no auditor is configured")]
    AuditorSignaturesPresent,

    #[error("invalid number of token inputs, expected at least 1")]
    NoInputs,

    #[error("there is no output")]
    NoOutputs,

    #[error("on redeem action, must have at least one issuer")]
    NoIssuerOnRedeem,

    #[error("input type {input} does not match type {expected}")]
    InputTypeMismatch { input: String, expected: String },

    #[error("output type {output} does not match type {expected}")]
    OutputTypeMismatch { output: String, expected: String },

    #[error("input sum {inputs} does not match output sum {outputs}")]
    Unbalanced { inputs: String, outputs: String },

    #[error("input {0} does not exist or has been spent")]
    UnknownInput(String),

    #[error("input {0} does not match the ledger")]
    InputMismatch(String),

    #[error("failed reading [{key}] from the ledger: {source}")]
    Ledger {
        key: String,
        #[source]
        source: LedgerError,
    },

    #[error("invalid htlc transfer: {0}")]
    Htlc(String),

    #[error("invalid htlc script: {0}")]
    Script(#[source] IdentityError),

    #[error("metadata key [{0}] appeared more than one time")]
    MetadataReplay(String),

    #[error("more metadata than those validated [{validated}] != [{total}]")]
    UnvalidatedMetadata { validated: usize, total: usize },

    #[error(transparent)]
    PublicParams(#[from] PublicParamsError),
}

impl ValidationError {
    /// The error beneath any rule annotations.
    pub fn root(&self) -> &ValidationError {
        match self {
            ValidationError::Rule { source, .. } => source.root(),
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no driver registered for [{0}]")]
    UnknownDriver(String),

    #[error("driver [{0}] is already registered")]
    DuplicateDriver(String),

    #[error(transparent)]
    PublicParams(#[from] PublicParamsError),
}
