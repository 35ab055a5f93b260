use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a chain data source.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The node could not be reached or returned a transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The call executed and reverted; `data` is the raw revert payload.
    #[error("call reverted with {} bytes of revert data", data.len())]
    Reverted { data: Bytes },
    /// A response was received but could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Read-only access to chain state, implemented over JSON-RPC or in memory.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Deployed bytecode at `address`; empty when nothing is deployed there.
    async fn get_code(&self, address: Address) -> Result<Bytes, ChainError>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError>;
}
