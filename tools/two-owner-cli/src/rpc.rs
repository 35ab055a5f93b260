//! JSON-RPC backed chain reader and base account builder.

use alloy_primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError, RpcError},
    types::{transaction::eip2718::TypedTransaction, TransactionRequest, H160, U256 as EthersU256},
};
use tracing::debug;
use two_owner_account_types::{
    calc_pre_verification_gas, BaseAccountApi, ChainError, ChainReader, GasOverheads,
    UnsignedUserOpRequest, UserOperation,
};

/// Verification budget before any account creation cost.
pub const DEFAULT_VERIFICATION_GAS_LIMIT: u64 = 100_000;

fn to_h160(address: Address) -> H160 {
    H160::from_slice(address.as_slice())
}

fn from_ethers_u256(value: EthersU256) -> U256 {
    U256::from_limbs(value.0)
}

/// Reverts keep their payload so callers can decode custom errors.
fn map_provider_error(err: ProviderError) -> ChainError {
    if let Some(data) = err.as_error_response().and_then(|e| e.as_revert_data()) {
        return ChainError::Reverted {
            data: Bytes::from(data.to_vec()),
        };
    }
    ChainError::Transport(err.to_string())
}

fn call_request(from: Option<Address>, to: Address, data: &[u8]) -> TypedTransaction {
    let mut request = TransactionRequest::new().to(to_h160(to)).data(data.to_vec());
    if let Some(from) = from {
        request = request.from(to_h160(from));
    }
    request.into()
}

/// [`ChainReader`] over an HTTP JSON-RPC endpoint.
#[derive(Debug)]
pub struct RpcChain {
    provider: Provider<Http>,
}

impl RpcChain {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("invalid RPC URL `{rpc_url}`"))?;
        Ok(Self { provider })
    }

    pub async fn estimate_gas(
        &self,
        from: Option<Address>,
        to: Address,
        data: &[u8],
    ) -> Result<U256, ChainError> {
        let tx = call_request(from, to, data);
        let gas = self
            .provider
            .estimate_gas(&tx, None)
            .await
            .map_err(map_provider_error)?;
        Ok(from_ethers_u256(gas))
    }

    /// `(maxFeePerGas, maxPriorityFeePerGas)` from the node's fee history.
    pub async fn estimate_fees(&self) -> Result<(U256, U256), ChainError> {
        let (max_fee, priority_fee) = self
            .provider
            .estimate_eip1559_fees(None)
            .await
            .map_err(map_provider_error)?;
        Ok((from_ethers_u256(max_fee), from_ethers_u256(priority_fee)))
    }
}

#[async_trait]
impl ChainReader for RpcChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(map_provider_error)?;
        Ok(chain_id.low_u64())
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ChainError> {
        let code = self
            .provider
            .get_code(to_h160(address), None)
            .await
            .map_err(map_provider_error)?;
        Ok(Bytes::from(code.to_vec()))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let tx = call_request(None, to, &data);
        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(map_provider_error)?;
        Ok(Bytes::from(output.to_vec()))
    }
}

/// Generic builder: estimates gas over RPC and prices calldata with [`GasOverheads`].
#[derive(Debug)]
pub struct RpcBase {
    chain: RpcChain,
    entry_point: Address,
    overheads: GasOverheads,
}

impl RpcBase {
    pub fn new(chain: RpcChain, entry_point: Address) -> Self {
        Self {
            chain,
            entry_point,
            overheads: GasOverheads::default(),
        }
    }
}

#[async_trait]
impl BaseAccountApi for RpcBase {
    fn provider(&self) -> &dyn ChainReader {
        &self.chain
    }

    fn entry_point(&self) -> Address {
        self.entry_point
    }

    async fn create_unsigned_user_op(
        &self,
        request: UnsignedUserOpRequest,
    ) -> Result<UserOperation, ChainError> {
        let call_gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => {
                self.chain
                    .estimate_gas(Some(self.entry_point), request.sender, &request.call_data)
                    .await?
            }
        };

        let mut verification_gas_limit = U256::from(DEFAULT_VERIFICATION_GAS_LIMIT);
        if request.init_code.len() > 20 {
            let factory = Address::from_slice(&request.init_code[..20]);
            let creation_gas = self
                .chain
                .estimate_gas(None, factory, &request.init_code[20..])
                .await?;
            debug!(%factory, %creation_gas, "estimated account creation");
            verification_gas_limit += creation_gas;
        }

        let (max_fee_per_gas, max_priority_fee_per_gas) =
            match (request.max_fee_per_gas, request.max_priority_fee_per_gas) {
                (Some(max_fee), Some(priority_fee)) => (max_fee, priority_fee),
                (max_fee, priority_fee) => {
                    let (estimated_max, estimated_priority) = self.chain.estimate_fees().await?;
                    (
                        max_fee.unwrap_or(estimated_max),
                        priority_fee.unwrap_or(estimated_priority),
                    )
                }
            };

        let mut op = UserOperation {
            sender: request.sender,
            nonce: request.nonce,
            init_code: request.init_code,
            call_data: request.call_data,
            call_gas_limit,
            verification_gas_limit,
            pre_verification_gas: U256::ZERO,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            paymaster_and_data: Bytes::new(),
            signature: Bytes::new(),
        };
        op.pre_verification_gas = calc_pre_verification_gas(&op, &self.overheads);
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_address_conversion() {
        let address = address!("63FaC9201494f0bd17B9892B9fae4d52fe3BD377");
        assert_eq!(to_h160(address).as_bytes(), address.as_slice());
    }

    #[test]
    fn test_u256_conversion() {
        let value = EthersU256::from(1_000_000_000_000_000_000u128) * EthersU256::from(1u64 << 40);
        assert_eq!(
            from_ethers_u256(value),
            U256::from(1_000_000_000_000_000_000u128) * U256::from(1u64 << 40)
        );
    }

    #[test]
    fn test_call_request_fields() {
        let to = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");
        let from = address!("63FaC9201494f0bd17B9892B9fae4d52fe3BD377");
        let tx = call_request(Some(from), to, &[0x9b, 0x24, 0x9f, 0x69]);
        assert_eq!(tx.to_addr(), Some(&to_h160(to)));
        assert_eq!(tx.from(), Some(&to_h160(from)));
        assert_eq!(tx.data().map(|d| d.to_vec()), Some(vec![0x9b, 0x24, 0x9f, 0x69]));
    }

    #[test]
    fn test_rpc_chain_rejects_bad_url() {
        assert!(RpcChain::new("not a url").is_err());
    }
}
