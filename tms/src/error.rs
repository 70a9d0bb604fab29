use tessera_core::{DriverError, PublicParamsError, ValidationError};
use tessera_ledger::TranslatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("public parameters are not set up in namespace [{0}]")]
    NotSetUp(String),

    #[error("public parameters are for driver [{actual}], scope is configured for [{expected}]")]
    DriverMismatch { expected: String, actual: String },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    PublicParams(#[from] PublicParamsError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Translator(#[from] TranslatorError),
}
