//! Shared utilities for the adapter.

pub mod crypto;
