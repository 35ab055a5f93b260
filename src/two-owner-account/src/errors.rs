use alloy_primitives::B256;
use thiserror::Error;
use two_owner_account_types::ChainError;

/// Errors raised by the two-owner account adapter.
#[derive(Debug, Error)]
pub enum AccountError {
    /// No usable factory address could be resolved.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("decoding error: {0}")]
    Decoding(String),
    /// The second owner signed a different hash than the operation now hashes to.
    #[error("second signature covers {signed}, but the operation hashes to {expected}")]
    HashMismatch { expected: B256, signed: B256 },
    /// Chain reads are surfaced exactly as the data source reported them.
    #[error(transparent)]
    Network(#[from] ChainError),
}
