//! The combined two-owner signature and the second owner's out-of-band contribution.

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::errors::AccountError;

/// `abi.encode(bytes ownerOneSignature, bytes ownerTwoSignature)`.
///
/// The account's validator decodes in exactly this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DualSignature {
    pub owner_one: Bytes,
    pub owner_two: Bytes,
}

impl DualSignature {
    #[must_use]
    pub const fn new(owner_one: Bytes, owner_two: Bytes) -> Self {
        Self {
            owner_one,
            owner_two,
        }
    }

    #[must_use]
    pub fn abi_encode(&self) -> Bytes {
        (self.owner_one.clone(), self.owner_two.clone())
            .abi_encode_params()
            .into()
    }

    /// # Errors
    ///
    /// Returns [`AccountError::Decoding`] if `data` is not a `(bytes, bytes)` tuple.
    pub fn abi_decode(data: &[u8]) -> Result<Self, AccountError> {
        let (owner_one, owner_two) = <(Bytes, Bytes)>::abi_decode_params(data, true)
            .map_err(|e| AccountError::Decoding(format!("signature is not (bytes, bytes): {e}")))?;
        Ok(Self::new(owner_one, owner_two))
    }
}

/// The second owner's raw signature over an authorization hash.
///
/// `signed_hash`, when present, is the hash the second owner was shown; assembly rejects it if
/// the operation no longer hashes to it. When absent the pairing is the caller's responsibility.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureProof {
    pub signed_message: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<B256>,
}

impl SignatureProof {
    #[must_use]
    pub const fn new(signed_message: Bytes) -> Self {
        Self {
            signed_message,
            signed_hash: None,
        }
    }

    #[must_use]
    pub const fn for_hash(signed_message: Bytes, signed_hash: B256) -> Self {
        Self {
            signed_message,
            signed_hash: Some(signed_hash),
        }
    }
}
