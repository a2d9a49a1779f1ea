//! Hash functions.
//!
//! Keccak-256 is used for signing digests and address derivation,
//! SHA-256 for document Merkle trees.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::types::Bytes32;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Bytes32 {
    Bytes32(Keccak256::digest(data).into())
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> Bytes32 {
    Bytes32(Sha256::digest(data).into())
}

/// SHA-256 over the concatenation of `parts`, without an intermediate buffer.
pub fn sha256_concat(parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Bytes32(hasher.finalize().into())
}
