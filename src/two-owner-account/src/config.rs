//! Factory address resolution and the gas adjustment applied to every operation.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::errors::AccountError;

/// Placeholder factory used when no override is configured.
///
/// No factory is deployed at this address; deployments must set `FACTORY_ADDRESS` (or
/// [`AccountConfig::factory_address`]) to their own factory.
pub const DEFAULT_FACTORY_ADDRESS: &str = "0x3b6C7fF8C5Ee2ee5c7f5a4D7E3c3f1A8d5E2b0c9";

/// 2.5x, applied to the base builder's `preVerificationGas`.
pub const DEFAULT_PRE_VERIFICATION_GAS_MULTIPLIER: GasMultiplier = GasMultiplier {
    numerator: 5,
    denominator: 2,
};

/// Rational multiplier over gas quantities. Results round down.
///
/// The denominator is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GasMultiplierParts")]
pub struct GasMultiplier {
    numerator: u64,
    denominator: u64,
}

#[derive(Deserialize)]
struct GasMultiplierParts {
    numerator: u64,
    denominator: u64,
}

impl TryFrom<GasMultiplierParts> for GasMultiplier {
    type Error = AccountError;

    fn try_from(parts: GasMultiplierParts) -> Result<Self, Self::Error> {
        Self::new(parts.numerator, parts.denominator)
    }
}

impl GasMultiplier {
    /// # Errors
    ///
    /// Returns [`AccountError::Configuration`] if `denominator` is zero.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, AccountError> {
        if denominator == 0 {
            return Err(AccountError::Configuration(format!(
                "gas multiplier {numerator}/0 has a zero denominator"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    #[must_use]
    pub const fn numerator(&self) -> u64 {
        self.numerator
    }

    #[must_use]
    pub const fn denominator(&self) -> u64 {
        self.denominator
    }

    #[must_use]
    pub fn apply(&self, value: U256) -> U256 {
        value.saturating_mul(U256::from(self.numerator)) / U256::from(self.denominator)
    }
}

impl Default for GasMultiplier {
    fn default() -> Self {
        DEFAULT_PRE_VERIFICATION_GAS_MULTIPLIER
    }
}

/// Adapter configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountConfig {
    /// Factory override; `None` or blank falls back to [`DEFAULT_FACTORY_ADDRESS`].
    pub factory_address: Option<String>,
    pub pre_verification_gas_multiplier: GasMultiplier,
}

impl AccountConfig {
    /// Creates a new [`AccountConfig`] with the default gas multiplier.
    #[must_use]
    pub fn new(factory_address: Option<String>) -> Self {
        Self {
            factory_address,
            pre_verification_gas_multiplier: GasMultiplier::default(),
        }
    }

    #[must_use]
    pub fn with_pre_verification_gas_multiplier(mut self, multiplier: GasMultiplier) -> Self {
        self.pre_verification_gas_multiplier = multiplier;
        self
    }

    /// The configured factory address string, or the default. Never fails.
    #[must_use]
    pub fn resolve_factory_address(&self) -> &str {
        match self.factory_address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => address,
            _ => DEFAULT_FACTORY_ADDRESS,
        }
    }

    /// The resolved factory address, parsed.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Configuration`] if the resolved value is not an address.
    pub fn factory_address(&self) -> Result<Address, AccountError> {
        let raw = self.resolve_factory_address();
        raw.parse::<Address>().map_err(|e| {
            AccountError::Configuration(format!("factory address `{raw}` is not an address: {e}"))
        })
    }
}
