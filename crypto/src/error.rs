use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("random source unavailable: {0}")]
    RandomSource(String),
}
