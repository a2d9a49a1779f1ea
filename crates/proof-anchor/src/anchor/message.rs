//! Signing messages for the anchoring protocol.
//!
//! Both messages are raw concatenations hashed with Keccak-256. Field
//! order is fixed; already-anchored data depends on it.
//!
//! ```text
//! pre-commit: anchor_id ‖ signing_root  ‖ identifier ‖ expiration (32-byte BE)
//! commit:     anchor_id ‖ document_root ‖ identifier
//! ```

use crate::codec::height_word;
use crate::crypto::hash::keccak256;
use crate::types::{Bytes32, Height, Identifier};

/// Packed pre-commit message.
pub fn pre_commit_message(
    anchor_id: &Bytes32,
    signing_root: &Bytes32,
    identifier: &Identifier,
    expiration_height: Height,
) -> Vec<u8> {
    let mut msg = Vec::with_capacity(96 + identifier.as_bytes().len());
    msg.extend_from_slice(&anchor_id.0);
    msg.extend_from_slice(&signing_root.0);
    msg.extend_from_slice(identifier.as_bytes());
    msg.extend_from_slice(&height_word(expiration_height));
    msg
}

/// Digest signed to authorize a pre-commit.
pub fn pre_commit_digest(
    anchor_id: &Bytes32,
    signing_root: &Bytes32,
    identifier: &Identifier,
    expiration_height: Height,
) -> Bytes32 {
    keccak256(&pre_commit_message(
        anchor_id,
        signing_root,
        identifier,
        expiration_height,
    ))
}

/// Packed commit message.
pub fn commit_message(
    anchor_id: &Bytes32,
    document_root: &Bytes32,
    identifier: &Identifier,
) -> Vec<u8> {
    let mut msg = Vec::with_capacity(64 + identifier.as_bytes().len());
    msg.extend_from_slice(&anchor_id.0);
    msg.extend_from_slice(&document_root.0);
    msg.extend_from_slice(identifier.as_bytes());
    msg
}

/// Digest signed to authorize a commit.
pub fn commit_digest(anchor_id: &Bytes32, document_root: &Bytes32, identifier: &Identifier) -> Bytes32 {
    keccak256(&commit_message(anchor_id, document_root, identifier))
}
