//! Shared types for the two-owner account adapter (ERC-4337 v0.6 entry point).
//!
//! This crate is the contract between the account-specific adapter and the generic
//! operation-construction layer: the user operation, its canonical hash, and the traits a
//! chain data source and a base account builder implement (in memory for tests, over
//! JSON-RPC in the CLI).

pub mod base;
pub mod chain;
pub mod entry_point;
pub mod gas;
pub mod user_op;

pub use base::{BaseAccountApi, TransactionDetails, UnsignedUserOpRequest};
pub use chain::{ChainError, ChainReader};
pub use gas::{calc_pre_verification_gas, GasOverheads};
pub use user_op::UserOperation;
