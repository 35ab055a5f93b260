use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use two_owner_account_types::ChainReader;

use super::interfaces::ITwoOwnerAccount;
use crate::errors::AccountError;

/// Handle to a (possibly undeployed) two-owner account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountContract {
    address: Address,
}

impl AccountContract {
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Calldata for `execute(dest, value, func)`.
    #[must_use]
    pub fn encode_execute(target: Address, value: U256, data: Bytes) -> Bytes {
        ITwoOwnerAccount::executeCall {
            dest: target,
            value,
            func: data,
        }
        .abi_encode()
        .into()
    }

    /// Reads `getNonce()` from the deployed account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Network`] if the call fails, or [`AccountError::Decoding`] if the
    /// return data is not a `uint256`.
    pub async fn nonce(&self, provider: &dyn ChainReader) -> Result<U256, AccountError> {
        let data = ITwoOwnerAccount::getNonceCall {}.abi_encode();
        let output = provider.call(self.address, data.into()).await?;
        let decoded = ITwoOwnerAccount::getNonceCall::abi_decode_returns(&output, true)
            .map_err(|e| AccountError::Decoding(format!("getNonce returned malformed data: {e}")))?;
        Ok(decoded.nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes, hex};

    #[test]
    fn test_encode_execute() {
        let call_data = AccountContract::encode_execute(
            address!("6a9f0B3e1c2D4e5f60718293A4B5C6d7E8F90A1B"),
            U256::from(1_000_000_000_000_000u64),
            bytes!("a9059cbb"),
        );
        let expected = hex!(
            "b61d27f6"
            "0000000000000000000000006a9f0b3e1c2d4e5f60718293a4b5c6d7e8f90a1b"
            "00000000000000000000000000000000000000000000000000038d7ea4c68000"
            "0000000000000000000000000000000000000000000000000000000000000060"
            "0000000000000000000000000000000000000000000000000000000000000004"
            "a9059cbb00000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(call_data.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_execute_selector() {
        let call_data = AccountContract::encode_execute(Address::ZERO, U256::ZERO, Bytes::new());
        assert_eq!(&call_data[..4], &[0xb6, 0x1d, 0x27, 0xf6]);
        assert_eq!(ITwoOwnerAccount::getNonceCall::SELECTOR, [0xd0, 0x87, 0xd2, 0x88]);
    }
}
