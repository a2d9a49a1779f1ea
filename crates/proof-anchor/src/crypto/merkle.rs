//! Sorted-pair SHA-256 Merkle proofs.
//!
//! Interior nodes hash the smaller child first, so a proof is only the
//! list of sibling hashes from leaf to root and carries no direction bits.
//! When a level has an odd node count the last node is carried up unchanged.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256_concat;
use crate::types::Bytes32;

/// Maximum proof depth accepted by [`verify_proof`].
pub const MAX_PROOF_DEPTH: usize = 64;

/// Hash two nodes in canonical order.
pub fn hash_pair(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    if a <= b {
        sha256_concat(&[&a.0, &b.0])
    } else {
        sha256_concat(&[&b.0, &a.0])
    }
}

/// Fold `leaf` through `proof` to a candidate root.
pub fn compute_root(leaf: &Bytes32, proof: &[Bytes32]) -> Bytes32 {
    proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling))
}

/// True when `leaf` folds through `proof` to `root`.
pub fn verify_proof(proof: &[Bytes32], root: &Bytes32, leaf: &Bytes32) -> bool {
    if proof.len() > MAX_PROOF_DEPTH {
        return false;
    }
    compute_root(leaf, proof) == *root
}

/// A fully materialized tree, used to build documents and their proofs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleTree {
    /// `levels[0]` are the leaves, the last level holds the root.
    levels: Vec<Vec<Bytes32>>,
}

impl MerkleTree {
    /// Build a tree over already-hashed leaves.
    ///
    /// An empty leaf set yields a tree whose root is zero.
    pub fn from_leaves(leaves: Vec<Bytes32>) -> Self {
        let mut levels = vec![leaves];
        while levels.last().map(|l| l.len() > 1).unwrap_or(false) {
            let current = &levels[levels.len() - 1];
            let next: Vec<Bytes32> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    pub fn root(&self) -> Bytes32 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Bytes32::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Sibling path for the leaf at `index`, or `None` if out of range.
    pub fn proof(&self, index: usize) -> Option<Vec<Bytes32>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut path = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = idx ^ 1;
            if let Some(node) = level.get(sibling) {
                path.push(*node);
            }
            idx /= 2;
        }
        Some(path)
    }
}
