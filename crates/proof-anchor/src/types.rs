//! Primitive value types shared by every component.
//!
//! Fixed-width values (`Bytes32`, `Address`) and the variable-width
//! `Identifier` serialize as `0x`-prefixed hex strings so they can be used
//! as JSON map keys in snapshots.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AnchorError, Result};

/// Position of the external log. Heights are the protocol's only clock.
pub type Height = u64;

/// Explicit caller and height of the call being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub caller: Address,
    pub height: Height,
}

impl TxContext {
    pub fn new(caller: Address, height: Height) -> Self {
        Self { caller, height }
    }
}

/// A 32-byte word: anchor ids, roots, key ids, token ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    pub const ZERO: Self = Self([0u8; 32]);

    /// True when every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a hex string, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            AnchorError::InvalidHex(format!("expected 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }

    /// Right-align a `u64` in a big-endian word.
    pub fn from_u64(value: u64) -> Self {
        let mut out = [0u8; 32];
        out[24..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({self})")
    }
}

/// A 20-byte principal address (callers, owners, identity instances).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        let arr: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            AnchorError::InvalidHex(format!("expected 20 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl From<[u8; 20]> for Address {
    fn from(value: [u8; 20]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Caller-chosen byte string naming an identity in the directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(pub Vec<u8>);

impl Identifier {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        decode_hex(s).map(Self)
    }
}

impl From<&[u8]> for Identifier {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).map_err(|e| AnchorError::InvalidHex(e.to_string()))
}

macro_rules! hex_serde {
    ($ty:ty, $parse:expr) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                $parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(Bytes32, Bytes32::from_hex);
hex_serde!(Address, Address::from_hex);
hex_serde!(Identifier, Identifier::from_hex);

/// Serde adapter for `Vec<u8>` fields stored as hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(trimmed).map_err(serde::de::Error::custom)
    }
}
