//! Two-owner account adapter.
//!
//! Produces ERC-4337 operations for an account controlled by two independent signers:
//! - owner one is held locally ([`OwnerKey`]) and signs during assembly;
//! - owner two is only known by address and signs out of band over the hash returned by
//!   [`TwoOwnerAccount::get_user_op_hash_to_sign`].
//!
//! The account may not be deployed yet. Until it is, every operation carries `initCode` so the
//! entry point deploys it atomically, and the nonce is zero.
//!
//! Signing flow: `create_unsigned_user_op` -> `get_user_op_hash_to_sign` -> (second owner signs)
//! -> `sign_user_op_with_context`. Any change to the operation after the hash was handed out
//! invalidates the second signature; that is only detected on-chain unless the caller supplies
//! the signed hash in [`SignatureProof::signed_hash`].

use std::sync::OnceLock;

use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::{debug, info};
use two_owner_account_types::{
    BaseAccountApi, TransactionDetails, UnsignedUserOpRequest, UserOperation,
};

use crate::{
    config::AccountConfig,
    contracts::{AccountContract, FactoryContract},
    errors::AccountError,
    signature::{DualSignature, SignatureProof},
    state::{PairingContext, SerializedState},
    utils::crypto::OwnerKey,
};

/// Factory salt. One account per owner pair.
pub const ACCOUNT_INDEX: U256 = U256::ZERO;

/// Adapter over a [`BaseAccountApi`] for a single two-owner account.
pub struct TwoOwnerAccount<B> {
    base: B,
    config: AccountConfig,
    owner_one: OwnerKey,
    /// May be empty until pairing completes; encoded as the zero address.
    owner_two: String,
    index: U256,
    account_contract: OnceLock<AccountContract>,
    factory_contract: OnceLock<FactoryContract>,
}

impl<B: BaseAccountApi> TwoOwnerAccount<B> {
    /// New account with a random local key; the counterpart becomes owner two.
    #[must_use]
    pub fn create(base: B, config: AccountConfig, context: &PairingContext) -> Self {
        Self::with_owners(
            base,
            config,
            OwnerKey::random(),
            context.counterpart_address.clone(),
        )
    }

    /// Restores an account from [`SerializedState`].
    ///
    /// The factory comes from `config`, so the account address changes if the configured
    /// factory changed since the state was saved.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidPrivateKey`] if the stored key does not parse.
    pub fn from_state(
        base: B,
        config: AccountConfig,
        state: &SerializedState,
    ) -> Result<Self, AccountError> {
        let owner_one = OwnerKey::from_hex(&state.private_key)?;
        Ok(Self::with_owners(
            base,
            config,
            owner_one,
            state.owner_two.clone(),
        ))
    }

    fn with_owners(base: B, config: AccountConfig, owner_one: OwnerKey, owner_two: String) -> Self {
        Self {
            base,
            config,
            owner_one,
            owner_two,
            index: ACCOUNT_INDEX,
            account_contract: OnceLock::new(),
            factory_contract: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn serialize(&self) -> SerializedState {
        SerializedState {
            private_key: self.owner_one.to_hex(),
            owner_two: self.owner_two.clone(),
        }
    }

    #[must_use]
    pub const fn base(&self) -> &B {
        &self.base
    }

    #[must_use]
    pub const fn config(&self) -> &AccountConfig {
        &self.config
    }

    #[must_use]
    pub fn owner_one_address(&self) -> Address {
        self.owner_one.address()
    }

    #[must_use]
    pub fn owner_two(&self) -> &str {
        &self.owner_two
    }

    /// Owner two as an address; an unset owner is the zero address.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidAddress`] if a non-empty value does not parse.
    pub fn owner_two_address(&self) -> Result<Address, AccountError> {
        let raw = self.owner_two.trim();
        if raw.is_empty() {
            return Ok(Address::ZERO);
        }
        raw.parse()
            .map_err(|_| AccountError::InvalidAddress(raw.to_string()))
    }

    #[must_use]
    pub const fn index(&self) -> U256 {
        self.index
    }

    /// # Errors
    ///
    /// Returns [`AccountError::Configuration`] if no factory address resolves.
    pub fn factory_address(&self) -> Result<Address, AccountError> {
        self.config.factory_address()
    }

    /// Memoized factory binding.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Configuration`] if no factory address resolves.
    pub fn bind_factory(&self) -> Result<&FactoryContract, AccountError> {
        if let Some(factory) = self.factory_contract.get() {
            return Ok(factory);
        }
        let factory = FactoryContract::new(self.factory_address()?);
        debug!(factory = %factory.address(), "bound factory contract");
        Ok(self.factory_contract.get_or_init(|| factory))
    }

    /// Memoized binding to the account at its counterfactual address.
    ///
    /// # Errors
    ///
    /// Returns an error if the init code cannot be built or the sender lookup fails.
    pub async fn bind_account(&self) -> Result<&AccountContract, AccountError> {
        if let Some(account) = self.account_contract.get() {
            return Ok(account);
        }
        let init_code = self.get_account_init_code()?;
        let address = self.base.sender_address(&init_code).await?;
        debug!(account = %address, "bound account contract");
        Ok(self
            .account_contract
            .get_or_init(|| AccountContract::new(address)))
    }

    /// `factory || createAccount(ownerOne, ownerTwo, index)`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Configuration`] if no factory address resolves, or
    /// [`AccountError::InvalidAddress`] if owner two is set but malformed.
    pub fn get_account_init_code(&self) -> Result<Bytes, AccountError> {
        let factory = self.bind_factory()?;
        Ok(factory.init_code(
            self.owner_one_address(),
            self.owner_two_address()?,
            self.index,
        ))
    }

    /// Deterministic address of this account, deployed or not.
    ///
    /// # Errors
    ///
    /// See [`Self::bind_account`].
    pub async fn counterfactual_address(&self) -> Result<Address, AccountError> {
        Ok(self.bind_account().await?.address())
    }

    /// Whether the account has not been deployed yet.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Network`] if the chain read fails.
    pub async fn is_phantom(&self) -> Result<bool, AccountError> {
        let account = self.bind_account().await?;
        Ok(self.base.is_phantom(account.address()).await?)
    }

    /// Next account nonce; zero while the account is phantom, whatever the chain reports.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Network`] if a chain read fails. There is no retry.
    pub async fn get_nonce(&self) -> Result<U256, AccountError> {
        let account = self.bind_account().await?;
        if self.base.is_phantom(account.address()).await? {
            debug!(account = %account.address(), "account not deployed, nonce is zero");
            return Ok(U256::ZERO);
        }
        account.nonce(self.base.provider()).await
    }

    /// Calldata for the account's `execute(target, value, data)`.
    #[must_use]
    pub fn encode_execute(&self, target: Address, value: U256, data: Bytes) -> Bytes {
        AccountContract::encode_execute(target, value, data)
    }

    /// Owner one's EIP-191 signature over the raw 32 hash bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Signing`] if the ECDSA operation fails.
    pub fn sign_owner_one(&self, hash: B256) -> Result<Bytes, AccountError> {
        self.owner_one.sign_message(hash.as_slice())
    }

    /// Signs arbitrary bytes with owner one's key. Not part of operation authorization.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Signing`] if the ECDSA operation fails.
    pub fn sign_message(&self, message: &[u8]) -> Result<Bytes, AccountError> {
        self.owner_one.sign_message(message)
    }

    /// The hash the second owner must sign before assembly.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Network`] if the chain id cannot be read.
    pub async fn get_user_op_hash_to_sign(&self, op: &UserOperation) -> Result<B256, AccountError> {
        Ok(self.base.user_op_hash(op).await?)
    }

    /// Returns `op` with `signature = abi.encode(ownerOneSig, proof.signed_message)`.
    ///
    /// The hash is recomputed from `op`. Without `proof.signed_hash` the second signature is
    /// taken as is.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::HashMismatch`] if `proof.signed_hash` is set and differs from the
    /// recomputed hash, or [`AccountError::Network`] if the chain id cannot be read.
    pub async fn sign_user_op_with_context(
        &self,
        op: &UserOperation,
        proof: &SignatureProof,
    ) -> Result<UserOperation, AccountError> {
        let hash = self.base.user_op_hash(op).await?;
        if let Some(signed) = proof.signed_hash {
            if signed != hash {
                return Err(AccountError::HashMismatch {
                    expected: hash,
                    signed,
                });
            }
        }

        let owner_one = self.sign_owner_one(hash)?;
        let signature = DualSignature::new(owner_one, proof.signed_message.clone()).abi_encode();
        info!(sender = %op.sender, %hash, "assembled two-owner signature");
        Ok(op.with_signature(signature))
    }

    /// Builds an unsigned operation for `details`.
    ///
    /// `initCode` is attached while the account is phantom. The base builder's
    /// `preVerificationGas` is scaled by the configured multiplier.
    ///
    /// # Errors
    ///
    /// Returns an error if binding, a chain read, or the base builder fails.
    pub async fn create_unsigned_user_op(
        &self,
        details: TransactionDetails,
    ) -> Result<UserOperation, AccountError> {
        let account = self.bind_account().await?;
        let sender = account.address();
        let phantom = self.base.is_phantom(sender).await?;

        let init_code = if phantom {
            self.get_account_init_code()?
        } else {
            Bytes::new()
        };
        let nonce = match details.nonce {
            Some(nonce) => nonce,
            None if phantom => U256::ZERO,
            None => account.nonce(self.base.provider()).await?,
        };
        let call_data = self.encode_execute(details.target, details.value, details.data);

        let op = self
            .base
            .create_unsigned_user_op(UnsignedUserOpRequest {
                sender,
                nonce,
                init_code,
                call_data,
                gas_limit: details.gas_limit,
                max_fee_per_gas: details.max_fee_per_gas,
                max_priority_fee_per_gas: details.max_priority_fee_per_gas,
            })
            .await?;

        let pre_verification_gas = self
            .config
            .pre_verification_gas_multiplier
            .apply(op.pre_verification_gas);
        debug!(
            base = %op.pre_verification_gas,
            adjusted = %pre_verification_gas,
            "scaled preVerificationGas"
        );
        Ok(UserOperation {
            pre_verification_gas,
            ..op
        })
    }
}
