//! Owner key handling and EIP-191 ("signed message") signatures.
//!
//! Signatures are 65 bytes, `r || s || v` with `v` in {27, 28}, low-s normalised.

use std::{fmt, str::FromStr};

use alloy_primitives::{Address, Bytes, PrimitiveSignature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::errors::AccountError;

/// Recover the address that produced `signature` over the EIP-191 digest of `message`.
///
/// Accepts `v` in {0, 1, 27, 28}.
///
/// # Errors
///
/// Returns [`AccountError::InvalidSignature`] if the signature is malformed or unrecoverable.
pub fn recover_signer(message: &[u8], signature: &[u8]) -> Result<Address, AccountError> {
    let signature = PrimitiveSignature::try_from(signature)
        .map_err(|e| AccountError::InvalidSignature(e.to_string()))?;
    signature
        .recover_address_from_msg(message)
        .map_err(|e| AccountError::InvalidSignature(e.to_string()))
}

/// The locally held owner key.
#[derive(Clone)]
pub struct OwnerKey {
    signer: PrivateKeySigner,
}

impl OwnerKey {
    /// Generates a fresh key from the thread RNG.
    #[must_use]
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Parses a 32-byte hex private key, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidPrivateKey`] if the input is not a valid secp256k1 scalar.
    pub fn from_hex(private_key: &str) -> Result<Self, AccountError> {
        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| AccountError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// `0x`-prefixed lowercase hex of the private key.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.signer.to_bytes().to_string()
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs `message` under EIP-191. A 32-byte hash passed here is signed as raw bytes,
    /// not re-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Signing`] if the ECDSA operation fails.
    pub fn sign_message(&self, message: &[u8]) -> Result<Bytes, AccountError> {
        let signature = self
            .signer
            .sign_message_sync(message)
            .map_err(|e| AccountError::Signing(e.to_string()))?;
        Ok(Bytes::copy_from_slice(&signature.as_bytes()))
    }
}

impl fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(OwnerKey))
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, hex};

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_address_from_key() {
        let key = OwnerKey::from_hex(KEY).unwrap();
        assert_eq!(key.address(), address!("2c7536E3605D9C16a7a3D7b1898e529396a65c23"));
    }

    #[test]
    fn test_hex_round_trip_without_prefix() {
        let key = OwnerKey::from_hex(&KEY[2..]).unwrap();
        assert_eq!(key.to_hex(), KEY);
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(matches!(
            OwnerKey::from_hex("0xzz").unwrap_err(),
            AccountError::InvalidPrivateKey(_)
        ));
        assert!(matches!(
            OwnerKey::from_hex(&format!("0x{}", "00".repeat(32))).unwrap_err(),
            AccountError::InvalidPrivateKey(_)
        ));
    }

    #[test]
    fn test_signature_is_over_eip191_digest() {
        let key = OwnerKey::from_hex(KEY).unwrap();
        let signature = key.sign_message(b"Some data").unwrap();
        let parsed = PrimitiveSignature::try_from(signature.as_ref()).unwrap();
        let digest = b256!("1da44b586eb0729ff70a73c326926f6ed5a25f5b056e7f47fbc6e58d86871655");
        assert_eq!(parsed.recover_address_from_prehash(&digest).unwrap(), key.address());
    }

    #[test]
    fn test_sign_message_vector() {
        let key = OwnerKey::from_hex(KEY).unwrap();
        let signature = key.sign_message(b"Some data").unwrap();
        let expected = hex!(
            "b91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd"
            "6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a029"
            "1c"
        );
        assert_eq!(signature.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_recover_signer() {
        let key = OwnerKey::from_hex(KEY).unwrap();
        let signature = key.sign_message(b"Some data").unwrap();
        assert_eq!(recover_signer(b"Some data", &signature).unwrap(), key.address());
        assert_ne!(recover_signer(b"Other data", &signature).unwrap(), key.address());

        // v in {0, 1} is accepted too
        let mut raw = signature.to_vec();
        raw[64] -= 27;
        assert_eq!(recover_signer(b"Some data", &raw).unwrap(), key.address());
    }

    #[test]
    fn test_recover_rejects_malformed() {
        assert!(recover_signer(b"x", &[0u8; 64]).is_err());
        let mut bad_v = [1u8; 65];
        bad_v[64] = 5;
        assert!(recover_signer(b"x", &bad_v).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = OwnerKey::from_hex(KEY).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains(&KEY[2..]));
        assert!(debug.contains("OwnerKey"));
    }
}
