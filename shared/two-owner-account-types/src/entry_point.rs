//! EntryPoint v0.6 ABI surface consumed by the base account API.

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// Canonical EntryPoint v0.6 deployment (same on all EVM chains).
pub const ENTRY_POINT_V06: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

sol! {
    interface IEntryPoint {
        /// Always thrown by `getSenderAddress`; carries the counterfactual account address.
        error SenderAddressResult(address sender);

        /// Simulates the factory call in `initCode` and reverts with `SenderAddressResult`.
        function getSenderAddress(bytes initCode) external;
    }
}
