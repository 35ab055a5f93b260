//! Solidity ABI surface of the deployed account and factory.

use alloy_sol_types::sol;

sol! {
    interface ITwoOwnerAccount {
        function execute(address dest, uint256 value, bytes func) external;
        function getNonce() external view returns (uint256 nonce);
    }

    interface ITwoOwnerAccountFactory {
        /// Deploys (or returns) the account for this owner pair and salt.
        function createAccount(address ownerOne, address ownerTwo, uint256 salt)
            external
            returns (address account);
    }
}
