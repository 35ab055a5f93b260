//! In-memory chain and base builder for adapter tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolError, SolValue};
use async_trait::async_trait;
use two_owner_account_types::{
    entry_point::{IEntryPoint, ENTRY_POINT_V06},
    BaseAccountApi, ChainError, ChainReader, UnsignedUserOpRequest, UserOperation,
};

use crate::contracts::interfaces::ITwoOwnerAccount;

pub const OWNER_ONE_KEY: &str =
    "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const OWNER_ONE: Address = address!("2c7536E3605D9C16a7a3D7b1898e529396a65c23");
pub const OWNER_TWO_KEY: &str =
    "0x8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";
pub const OWNER_TWO: Address = address!("63FaC9201494f0bd17B9892B9fae4d52fe3BD377");
pub const SENDER: Address = address!("5A0b54D5dC17e0AadC383d2db43B0a0D3E029c4C");
pub const BASE_PRE_VERIFICATION_GAS: u64 = 50_000;

/// Chain with a single account at [`SENDER`].
#[derive(Debug, Default)]
pub struct MockChain {
    /// Whether code exists at [`SENDER`].
    pub deployed: bool,
    /// What `getNonce()` on the account reports, even when not deployed.
    pub nonce: U256,
    pub fail_nonce: bool,
    pub sender_lookups: AtomicUsize,
}

#[async_trait]
impl ChainReader for MockChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(1)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ChainError> {
        if self.deployed && address == SENDER {
            Ok(Bytes::from_static(&[0x60, 0x80]))
        } else {
            Ok(Bytes::new())
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        if to == ENTRY_POINT_V06
            && data.starts_with(&IEntryPoint::getSenderAddressCall::SELECTOR)
        {
            self.sender_lookups.fetch_add(1, Ordering::SeqCst);
            let revert = IEntryPoint::SenderAddressResult { sender: SENDER };
            return Err(ChainError::Reverted {
                data: revert.abi_encode().into(),
            });
        }
        if to == SENDER && data.starts_with(&ITwoOwnerAccount::getNonceCall::SELECTOR) {
            if self.fail_nonce {
                return Err(ChainError::Transport("connection reset".to_string()));
            }
            return Ok(self.nonce.abi_encode().into());
        }
        Err(ChainError::Transport(format!("unexpected call to {to}")))
    }
}

/// Base builder that fills fixed gas values.
#[derive(Debug, Default)]
pub struct MockBase {
    pub chain: MockChain,
}

impl MockBase {
    pub fn phantom() -> Self {
        Self::default()
    }

    pub fn deployed(nonce: u64) -> Self {
        Self {
            chain: MockChain {
                deployed: true,
                nonce: U256::from(nonce),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl BaseAccountApi for MockBase {
    fn provider(&self) -> &dyn ChainReader {
        &self.chain
    }

    fn entry_point(&self) -> Address {
        ENTRY_POINT_V06
    }

    async fn create_unsigned_user_op(
        &self,
        request: UnsignedUserOpRequest,
    ) -> Result<UserOperation, ChainError> {
        Ok(UserOperation {
            sender: request.sender,
            nonce: request.nonce,
            init_code: request.init_code,
            call_data: request.call_data,
            call_gas_limit: request.gas_limit.unwrap_or(U256::from(100_000u64)),
            verification_gas_limit: U256::from(200_000u64),
            pre_verification_gas: U256::from(BASE_PRE_VERIFICATION_GAS),
            max_fee_per_gas: request
                .max_fee_per_gas
                .unwrap_or(U256::from(1_000_000_000u64)),
            max_priority_fee_per_gas: request
                .max_priority_fee_per_gas
                .unwrap_or(U256::from(1_000_000_000u64)),
            paymaster_and_data: Bytes::new(),
            signature: Bytes::new(),
        })
    }
}
