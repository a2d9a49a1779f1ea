//! secp256k1 key pairs and signer identity derivation.
//!
//! A signer is known on the ledger by its 20-byte address, and inside a
//! key registry by the `bytes32` key whose high 20 bytes are that address.

use k256::ecdsa::{SigningKey, VerifyingKey};

use crate::crypto::hash::keccak256;
use crate::error::{AnchorError, Result};
use crate::types::{Address, Bytes32};

/// A secp256k1 key pair for producing recoverable signatures.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Secp256k1KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw secret scalar bytes.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| AnchorError::InvalidInput(format!("invalid secret key: {e}")))?;
        let verifying_key = VerifyingKey::from(&signing_key);
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// The signer's ledger address.
    pub fn address(&self) -> Address {
        address_of(&self.verifying_key)
    }

    /// The signer's key-registry key.
    pub fn key(&self) -> Bytes32 {
        key_of_address(&self.address())
    }
}

/// Derive the 20-byte address of a verifying key.
pub fn address_of(verifying_key: &VerifyingKey) -> Address {
    let point = verifying_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash.0[12..]);
    Address(out)
}

/// Place an address in the high 20 bytes of a key-registry key.
pub fn key_of_address(address: &Address) -> Bytes32 {
    let mut out = [0u8; 32];
    out[..20].copy_from_slice(&address.0);
    Bytes32(out)
}
