//! Typed identifiers for markets and accounts
//!
//! Zero-cost wrappers prevent id confusion bugs at compile time: a
//! `MarketId` can never be passed where an `AccountId` is expected. Account
//! ids are opaque 20-byte identities rendered as hex; the engine verifies
//! them against its configured admin role but attaches no other meaning.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing identifiers from external input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdentifierError {
    /// Hex payload does not decode to exactly 20 bytes
    #[error("Account id must be 20 bytes, got {got}")]
    InvalidLength { got: usize },

    /// Input is not valid hexadecimal
    #[error("Invalid hex in account id: '{input}'")]
    InvalidHex { input: String },
}

/// Monotonically assigned market identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketId(pub u64);

impl MarketId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque 20-byte account identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The all-zero account; used as a placeholder, never a real caller
    pub const ZERO: Self = Self([0u8; 20]);

    /// Parse from a hex string, with or without a 0x prefix
    pub fn from_hex(input: &str) -> Result<Self, IdentifierError> {
        let trimmed = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(trimmed).map_err(|_| IdentifierError::InvalidHex {
            input: input.to_string(),
        })?;
        let len = bytes.len();
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| IdentifierError::InvalidLength { got: len })
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Abbreviated form for log lines
    pub fn short(&self) -> String {
        hex::encode(self.0)[..8].to_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Serialized as a hex string for readable snapshots and event payloads
impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}
