use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use super::interfaces::ITwoOwnerAccountFactory;

/// Handle to the account factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactoryContract {
    address: Address,
}

impl FactoryContract {
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Calldata for `createAccount(ownerOne, ownerTwo, salt)`.
    #[must_use]
    pub fn encode_create_account(owner_one: Address, owner_two: Address, salt: U256) -> Bytes {
        ITwoOwnerAccountFactory::createAccountCall {
            ownerOne: owner_one,
            ownerTwo: owner_two,
            salt,
        }
        .abi_encode()
        .into()
    }

    /// `initCode` = factory address (20 bytes) || `createAccount` calldata.
    #[must_use]
    pub fn init_code(&self, owner_one: Address, owner_two: Address, salt: U256) -> Bytes {
        let call = Self::encode_create_account(owner_one, owner_two, salt);
        let mut buf = Vec::with_capacity(20 + call.len());
        buf.extend_from_slice(self.address.as_slice());
        buf.extend_from_slice(&call);
        buf.into()
    }
}
