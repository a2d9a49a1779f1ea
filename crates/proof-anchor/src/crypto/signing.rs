//! Recoverable secp256k1 signatures.
//!
//! Two digest conventions are supported:
//!
//! - **Personal**: the 32-byte digest is prefixed with
//!   `"\x19Ethereum Signed Message:\n32"` and hashed again before recovery,
//!   matching common off-ledger wallet signing.
//! - **Consensus**: recovery runs directly over the supplied digest.
//!
//! Recovery never errors. A signature that cannot be recovered yields
//! [`NO_SIGNER`], and callers compare against it explicitly.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::crypto::hash::keccak256;
use crate::crypto::keys::{address_of, key_of_address};
use crate::error::{AnchorError, Result};
use crate::types::{Address, Bytes32};

/// Prefix of the personal-message scheme.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Length of an `r ‖ s ‖ v` signature.
pub const SIGNATURE_LEN: usize = 65;

/// Sentinel returned when no signer can be recovered.
pub const NO_SIGNER: Bytes32 = Bytes32::ZERO;

/// Which digest convention a signature was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestScheme {
    Personal,
    Consensus,
}

impl DigestScheme {
    /// The 32 bytes actually signed for `digest` under this scheme.
    pub fn prehash(&self, digest: &Bytes32) -> Bytes32 {
        match self {
            Self::Personal => personal_digest(digest),
            Self::Consensus => *digest,
        }
    }
}

/// `keccak256(prefix ‖ digest)`.
pub fn personal_digest(digest: &Bytes32) -> Bytes32 {
    let mut buf = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    buf.extend_from_slice(&digest.0);
    keccak256(&buf)
}

/// Sign `digest` under `scheme`, returning `r ‖ s ‖ v` with `v` in `{27, 28}`.
pub fn sign(
    signing_key: &SigningKey,
    digest: &Bytes32,
    scheme: DigestScheme,
) -> Result<[u8; SIGNATURE_LEN]> {
    let prehash = scheme.prehash(digest);
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&prehash.0)
        .map_err(|e| AnchorError::InvalidInput(format!("signing failed: {e}")))?;

    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}

/// Sign under the personal scheme.
pub fn sign_personal(signing_key: &SigningKey, digest: &Bytes32) -> Result<[u8; SIGNATURE_LEN]> {
    sign(signing_key, digest, DigestScheme::Personal)
}

/// Sign under the consensus scheme.
pub fn sign_consensus(signing_key: &SigningKey, digest: &Bytes32) -> Result<[u8; SIGNATURE_LEN]> {
    sign(signing_key, digest, DigestScheme::Consensus)
}

/// Recover the signer address, or `None` if the signature is unusable.
pub fn recover_address(
    digest: &Bytes32,
    signature: &[u8],
    scheme: DigestScheme,
) -> Option<Address> {
    if signature.len() != SIGNATURE_LEN {
        return None;
    }
    let sig = Signature::from_slice(&signature[..64]).ok()?;
    let v = match signature[64] {
        0 | 1 => signature[64],
        27 | 28 => signature[64] - 27,
        _ => return None,
    };
    let recovery_id = RecoveryId::from_byte(v)?;
    let prehash = scheme.prehash(digest);
    let verifying_key = VerifyingKey::recover_from_prehash(&prehash.0, &sig, recovery_id).ok()?;
    Some(address_of(&verifying_key))
}

/// Recover the key-registry key of a personal-scheme signer.
pub fn recover_personal(digest: &Bytes32, signature: &[u8]) -> Bytes32 {
    recover_address(digest, signature, DigestScheme::Personal)
        .map(|addr| key_of_address(&addr))
        .unwrap_or(NO_SIGNER)
}

/// Recover the key-registry key of a consensus-scheme signer.
///
/// Fails closed: a signature of the wrong length, or one that does not
/// recover, returns [`NO_SIGNER`].
pub fn recover_public_key_from_consensus_signature(signature: &[u8], digest: &Bytes32) -> Bytes32 {
    recover_address(digest, signature, DigestScheme::Consensus)
        .map(|addr| key_of_address(&addr))
        .unwrap_or(NO_SIGNER)
}
