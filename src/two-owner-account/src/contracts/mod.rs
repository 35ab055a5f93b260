//! Typed bindings to the two-owner account and its factory.
//!
//! Both contracts may not exist on-chain yet; a binding is only an address plus the ABI.

pub mod account;
pub mod factory;
pub mod interfaces;

pub use account::AccountContract;
pub use factory::FactoryContract;
