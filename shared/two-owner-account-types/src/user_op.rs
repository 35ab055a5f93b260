use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// ERC-4337 v0.6 user operation (the entry point's `UserOperation` struct).
///
/// Quantities serialize as `0x`-prefixed hex, matching the bundler JSON-RPC shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    /// Factory address followed by the factory calldata; empty once the account is deployed.
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    /// Opaque to the entry point; decoded by the account's validation logic.
    pub signature: Bytes,
}

impl UserOperation {
    /// Returns a copy of this operation carrying `signature`.
    #[must_use]
    pub fn with_signature(&self, signature: Bytes) -> Self {
        Self {
            signature,
            ..self.clone()
        }
    }

    /// ABI-encode every field except the signature, hashing the dynamic ones.
    ///
    /// Matches `UserOperationLib.pack` followed by `keccak256` inputs in EntryPoint v0.6.
    pub fn pack(&self) -> Vec<u8> {
        (
            self.sender,
            self.nonce,
            keccak256(&self.init_code),
            keccak256(&self.call_data),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            keccak256(&self.paymaster_and_data),
        )
            .abi_encode()
    }

    /// Canonical authorization hash:
    /// `keccak256(abi.encode(keccak256(pack(op)), entryPoint, chainId))`.
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        let inner = keccak256(self.pack());
        keccak256((inner, entry_point, U256::from(chain_id)).abi_encode())
    }
}
