//! Field proofs against a document root.
//!
//! A field leaf is `sha256(property ‖ value ‖ salt)`. Callers supply
//! fields as four positional arrays; they are zipped into [`FieldProof`]s
//! only after their lengths are checked.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256_concat;
use crate::crypto::merkle::{compute_root, verify_proof};
use crate::error::{AnchorError, Result};
use crate::types::Bytes32;

/// Leaf hash of a single document field.
pub fn leaf_hash(property: &[u8], value: &[u8], salt: &Bytes32) -> Bytes32 {
    sha256_concat(&[property, value, &salt.0])
}

/// One document field together with its sibling path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProof {
    #[serde(with = "crate::types::hex_bytes")]
    pub property: Vec<u8>,
    #[serde(with = "crate::types::hex_bytes")]
    pub value: Vec<u8>,
    pub salt: Bytes32,
    pub proof: Vec<Bytes32>,
}

impl FieldProof {
    pub fn leaf(&self) -> Bytes32 {
        leaf_hash(&self.property, &self.value, &self.salt)
    }

    /// The root this field folds up to.
    pub fn compute_root(&self) -> Bytes32 {
        compute_root(&self.leaf(), &self.proof)
    }

    pub fn verify(&self, root: &Bytes32) -> bool {
        verify_proof(&self.proof, root, &self.leaf())
    }
}

/// Zip positional arrays into field proofs.
///
/// Rejects a length mismatch before any hashing, and an empty set.
pub fn zip_fields(
    properties: Vec<Vec<u8>>,
    values: Vec<Vec<u8>>,
    salts: Vec<Bytes32>,
    proofs: Vec<Vec<Bytes32>>,
) -> Result<Vec<FieldProof>> {
    let n = properties.len();
    if values.len() != n || salts.len() != n || proofs.len() != n {
        return Err(AnchorError::LengthMismatch {
            properties: n,
            values: values.len(),
            salts: salts.len(),
            proofs: proofs.len(),
        });
    }
    if n == 0 {
        return Err(AnchorError::EmptyField("properties"));
    }
    if properties.iter().any(Vec::is_empty) {
        return Err(AnchorError::EmptyField("property"));
    }

    Ok(properties
        .into_iter()
        .zip(values)
        .zip(salts)
        .zip(proofs)
        .map(|(((property, value), salt), proof)| FieldProof {
            property,
            value,
            salt,
            proof,
        })
        .collect())
}

/// Every field must fold to `root`; the first that does not fails the set.
pub fn verify_fields(fields: &[FieldProof], root: &Bytes32) -> Result<()> {
    for (index, field) in fields.iter().enumerate() {
        if !field.verify(root) {
            log::debug!("field #{index} does not reach root {root}");
            return Err(AnchorError::ProofMismatch { index });
        }
    }
    Ok(())
}
