//! The generic account API the two-owner adapter composes over.
//!
//! Implementations own the chain data source and the entry-point binding; the adapter only
//! supplies account-specific pieces (sender, nonce, initCode, callData).

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolError};
use async_trait::async_trait;

use crate::{
    chain::{ChainError, ChainReader},
    entry_point::IEntryPoint,
    user_op::UserOperation,
};

/// A call the account should execute, plus optional gas and nonce overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionDetails {
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
    /// Explicit account nonce; read from the account when absent.
    pub nonce: Option<U256>,
    /// Explicit `callGasLimit`; estimated when absent.
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Account-specific fields handed to [`BaseAccountApi::create_unsigned_user_op`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnsignedUserOpRequest {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Base operation API: chain access, authorization hash, phantom detection, and the generic
/// unsigned-operation builder.
#[async_trait]
pub trait BaseAccountApi: Send + Sync {
    /// Read-only chain data source.
    fn provider(&self) -> &dyn ChainReader;

    /// Entry point the operations are addressed to.
    fn entry_point(&self) -> Address;

    /// The exact hash the entry point will check signatures against.
    async fn user_op_hash(&self, op: &UserOperation) -> Result<B256, ChainError> {
        let chain_id = self.provider().chain_id().await?;
        Ok(op.hash(self.entry_point(), chain_id))
    }

    /// Whether `account` has no code deployed yet.
    async fn is_phantom(&self, account: Address) -> Result<bool, ChainError> {
        Ok(self.provider().get_code(account).await?.is_empty())
    }

    /// Counterfactual address the entry point would deploy `init_code` to.
    ///
    /// `getSenderAddress` always reverts; the address travels in `SenderAddressResult`.
    async fn sender_address(&self, init_code: &Bytes) -> Result<Address, ChainError> {
        let call = IEntryPoint::getSenderAddressCall {
            initCode: init_code.clone(),
        };
        match self
            .provider()
            .call(self.entry_point(), call.abi_encode().into())
            .await
        {
            Err(ChainError::Reverted { data }) => {
                IEntryPoint::SenderAddressResult::abi_decode(&data, true)
                    .map(|result| result.sender)
                    .map_err(|e| {
                        ChainError::Decoding(format!("unexpected getSenderAddress revert: {e}"))
                    })
            }
            Ok(_) => Err(ChainError::Decoding(
                "getSenderAddress returned without reverting".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    /// Fill gas and fee fields around the account-specific request. The signature is empty.
    async fn create_unsigned_user_op(
        &self,
        request: UnsignedUserOpRequest,
    ) -> Result<UserOperation, ChainError>;
}
