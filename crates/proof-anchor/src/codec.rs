//! Byte-level codecs and fixed-width extraction.
//!
//! Signing messages are raw concatenations, so heights are written as
//! 32-byte big-endian words to match packed `uint256` encoding.

use crate::error::{AnchorError, Result};
use crate::types::{Address, Bytes32, Height};

/// Encode a height as a 32-byte big-endian word.
pub fn height_word(height: Height) -> [u8; 32] {
    Bytes32::from_u64(height).0
}

/// Read a 32-byte word starting at `offset`.
pub fn extract_bytes32(data: &[u8], offset: usize) -> Result<Bytes32> {
    let slice = window(data, offset, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(slice);
    Ok(Bytes32(out))
}

/// Read a 20-byte address starting at `offset`.
pub fn extract_address(data: &[u8], offset: usize) -> Result<Address> {
    let slice = window(data, offset, 20)?;
    let mut out = [0u8; 20];
    out.copy_from_slice(slice);
    Ok(Address(out))
}

/// Read a big-endian word at `offset` and narrow it to `u64`.
///
/// Fails with `ValueOverflow` if any of the high 24 bytes is set.
pub fn extract_u64(data: &[u8], offset: usize) -> Result<u64> {
    let word = extract_bytes32(data, offset)?;
    word_to_u64(&word)
}

/// Narrow a big-endian word to `u64`.
pub fn word_to_u64(word: &Bytes32) -> Result<u64> {
    if word.0[..24].iter().any(|b| *b != 0) {
        return Err(AnchorError::ValueOverflow);
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word.0[24..]);
    Ok(u64::from_be_bytes(tail))
}

/// Split a raw proof blob into 32-byte sibling hashes.
pub fn decode_proof(raw: &[u8]) -> Result<Vec<Bytes32>> {
    if raw.len() % 32 != 0 {
        return Err(AnchorError::MalformedProof { len: raw.len() });
    }
    Ok(raw
        .chunks_exact(32)
        .map(|chunk| {
            let mut out = [0u8; 32];
            out.copy_from_slice(chunk);
            Bytes32(out)
        })
        .collect())
}

/// Inverse of [`decode_proof`].
pub fn encode_proof(proof: &[Bytes32]) -> Vec<u8> {
    proof.iter().flat_map(|h| h.0).collect()
}

fn window(data: &[u8], offset: usize, needed: usize) -> Result<&[u8]> {
    let end = offset.checked_add(needed).ok_or(AnchorError::OutOfBounds {
        offset,
        needed,
        len: data.len(),
    })?;
    data.get(offset..end).ok_or(AnchorError::OutOfBounds {
        offset,
        needed,
        len: data.len(),
    })
}
