//! Client-side adapter for a two-owner ERC-4337 smart account.
//!
//! See [`account::TwoOwnerAccount`] for the signing flow.

pub mod account;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod signature;
pub mod state;
pub mod utils;

#[cfg(test)]
mod testing;

pub use account::{TwoOwnerAccount, ACCOUNT_INDEX};
pub use config::{AccountConfig, GasMultiplier, DEFAULT_FACTORY_ADDRESS};
pub use errors::AccountError;
pub use signature::{DualSignature, SignatureProof};
pub use state::{PairingContext, SerializedState};
pub use utils::crypto::{recover_signer, OwnerKey};
