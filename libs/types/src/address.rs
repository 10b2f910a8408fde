//! 20-byte account and token identifiers
//!
//! Accounts, token contracts, pools and routers all share one identifier
//! space, exactly as on an EVM chain. The text form is `0x`-prefixed hex and
//! is what configuration files and serde use.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address length in bytes
pub const ADDRESS_LEN: usize = 20;

/// Errors produced while parsing an address from text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Input was not valid hex
    #[error("Invalid hex in address '{input}'")]
    InvalidHex { input: String },

    /// Decoded byte length was not 20
    #[error("Address must be 20 bytes, got {len}")]
    InvalidLength { len: usize },
}

/// Account or token identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The zero address, never a valid asset or counterparty
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address whose low 8 bytes hold `value` (big-endian)
    ///
    /// Handy for deterministic fixtures: `Address::from_low_u64(1)` is
    /// `0x0000…0001`.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let decoded = hex::decode(stripped).map_err(|_| AddressError::InvalidHex {
            input: s.to_string(),
        })?;
        let bytes: [u8; ADDRESS_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength { len: decoded.len() })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
