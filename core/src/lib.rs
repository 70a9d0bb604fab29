//! Scheme-independent machinery of the token protocol.
//!
//! A scheme (see the `fabtoken` crate) supplies concrete public parameters
//! and action types through [`Scheme`]; this crate provides the validator
//! that runs the scheme's check pipelines, the token request wire format,
//! the public-parameter envelope, and the registry that maps a parameter
//! identifier to the driver able to validate requests under it.

pub mod auditing;
pub mod context;
pub mod driver;
pub mod error;
pub mod pp;
pub mod request;
pub mod signature;
pub mod validator;

pub use context::ValidationContext;
pub use driver::{Driver, DriverRegistry, TokenRequestValidator, ValidatedAction};
pub use error::{DriverError, PublicParamsError, ValidationError};
pub use pp::{driver_identifier, PublicParameters, PublicParamsManager, SerializedPublicParams};
pub use request::TokenRequest;
pub use signature::{RequestSignatureBackend, SignatureProvider};
pub use validator::{ActionDeserializer, Check, CheckFn, Scheme, Validator};
