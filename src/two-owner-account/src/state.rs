//! Persisted form of an account and the context a fresh account is created from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `{ privateKey, ownerTwo }`.
///
/// The factory address is deliberately absent: a restored account re-resolves it from the
/// configuration in effect at restore time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedState {
    pub private_key: String,
    pub owner_two: String,
}

impl fmt::Debug for SerializedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(SerializedState))
            .field("private_key", &"<redacted>")
            .field("owner_two", &self.owner_two)
            .finish()
    }
}

/// Pairing established with a counterpart session; its address becomes the second owner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingContext {
    pub counterpart_address: String,
}

impl PairingContext {
    #[must_use]
    pub fn new(counterpart_address: impl Into<String>) -> Self {
        Self {
            counterpart_address: counterpart_address.into(),
        }
    }
}
