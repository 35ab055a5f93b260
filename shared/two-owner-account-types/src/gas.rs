use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolValue;

use crate::user_op::UserOperation;

/// Calldata cost model for `preVerificationGas`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasOverheads {
    /// Fixed per-bundle overhead, shared across `bundle_size` operations.
    pub fixed: u64,
    pub per_user_op: u64,
    pub per_user_op_word: u64,
    pub zero_byte: u64,
    pub non_zero_byte: u64,
    pub bundle_size: u64,
    /// Length of the placeholder signature priced in when the real one is not known yet.
    pub sig_size: usize,
}

impl Default for GasOverheads {
    fn default() -> Self {
        Self {
            fixed: 21_000,
            per_user_op: 18_300,
            per_user_op_word: 4,
            zero_byte: 4,
            non_zero_byte: 16,
            bundle_size: 1,
            sig_size: 65,
        }
    }
}

/// Gas the bundler spends outside of verification and execution for `op`.
///
/// The operation is priced with a `sig_size` placeholder signature of `0x01` bytes.
pub fn calc_pre_verification_gas(op: &UserOperation, overheads: &GasOverheads) -> U256 {
    let packed = (
        op.sender,
        op.nonce,
        op.init_code.clone(),
        op.call_data.clone(),
        op.call_gas_limit,
        op.verification_gas_limit,
        op.pre_verification_gas,
        op.max_fee_per_gas,
        op.max_priority_fee_per_gas,
        op.paymaster_and_data.clone(),
        Bytes::from(vec![1u8; overheads.sig_size]),
    )
        .abi_encode_params();

    let call_data_cost: u64 = packed
        .iter()
        .map(|b| {
            if *b == 0 {
                overheads.zero_byte
            } else {
                overheads.non_zero_byte
            }
        })
        .sum();
    let words = packed.len().div_ceil(32) as u64;

    U256::from(
        call_data_cost
            + overheads.fixed / overheads.bundle_size.max(1)
            + overheads.per_user_op
            + overheads.per_user_op_word * words,
    )
}
