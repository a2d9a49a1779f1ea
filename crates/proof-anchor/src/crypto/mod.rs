//! Cryptographic primitives for proof-anchor.
//!
//! This module provides:
//! - Keccak-256 and SHA-256 hashing
//! - secp256k1 key pairs and address derivation
//! - Recoverable signatures under the personal and consensus digest schemes
//! - Sorted-pair Merkle proof verification and tree building

pub mod hash;
pub mod keys;
pub mod merkle;
pub mod signing;
