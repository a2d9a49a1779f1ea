//! Provable documents.
//!
//! A document has a data section and an optional signature section, each
//! its own Merkle tree of field leaves:
//!
//! ```text
//!                 document_root
//!                /             \
//!        signing_root     signatures_root
//!        (data fields)    (signing root + signature fields)
//! ```
//!
//! With no signature section the document root is the signing root. The
//! signing root is a direct child of the document root, so its anchoring
//! proof is the single sibling `signatures_root`.

use rand::RngCore;

use crate::config::MintConfig;
use crate::crypto::merkle::{hash_pair, MerkleTree};
use crate::error::{AnchorError, Result};
use crate::types::Bytes32;

use super::proof::{leaf_hash, FieldProof};

#[derive(Debug, Clone)]
struct DocumentField {
    property: Vec<u8>,
    value: Vec<u8>,
    salt: Bytes32,
}

impl DocumentField {
    fn leaf(&self) -> Bytes32 {
        leaf_hash(&self.property, &self.value, &self.salt)
    }
}

/// Random 32-byte salt.
pub fn random_salt() -> Bytes32 {
    let mut salt = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut salt);
    Bytes32(salt)
}

/// Builder for a document's data section.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    fields: Vec<DocumentField>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with an explicit salt.
    pub fn field(mut self, property: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, salt: Bytes32) -> Self {
        self.fields.push(DocumentField {
            property: property.into(),
            value: value.into(),
            salt,
        });
        self
    }

    /// Add a field with a fresh random salt.
    pub fn salted_field(self, property: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.field(property, value, random_salt())
    }

    pub fn build(self) -> Result<ProvableDocument> {
        if self.fields.is_empty() {
            return Err(AnchorError::EmptyField("fields"));
        }
        check_unique(&self.fields)?;
        let data_tree = MerkleTree::from_leaves(self.fields.iter().map(DocumentField::leaf).collect());
        Ok(ProvableDocument {
            fields: self.fields,
            signatures: Vec::new(),
            data_tree,
            signature_tree: MerkleTree::from_leaves(Vec::new()),
        })
    }
}

fn check_unique(fields: &[DocumentField]) -> Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if field.property.is_empty() {
            return Err(AnchorError::EmptyField("property"));
        }
        if fields[..i].iter().any(|f| f.property == field.property) {
            return Err(AnchorError::InvalidInput(format!(
                "duplicate property 0x{}",
                hex::encode(&field.property)
            )));
        }
    }
    Ok(())
}

/// A document with both Merkle sections materialized.
#[derive(Debug, Clone)]
pub struct ProvableDocument {
    fields: Vec<DocumentField>,
    signatures: Vec<DocumentField>,
    data_tree: MerkleTree,
    signature_tree: MerkleTree,
}

impl ProvableDocument {
    /// Root of the data section.
    pub fn signing_root(&self) -> Bytes32 {
        self.data_tree.root()
    }

    pub fn signatures_root(&self) -> Bytes32 {
        self.signature_tree.root()
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    pub fn document_root(&self) -> Bytes32 {
        if self.is_signed() {
            hash_pair(&self.signing_root(), &self.signatures_root())
        } else {
            self.signing_root()
        }
    }

    /// Proof that the signing root belongs to the document root.
    pub fn signing_root_proof(&self) -> Vec<Bytes32> {
        if self.is_signed() {
            vec![self.signatures_root()]
        } else {
            Vec::new()
        }
    }

    /// Attach the signature section: the signing root and a signature over
    /// it, under the property paths named in `config`.
    pub fn with_signature(mut self, config: &MintConfig, signature: &[u8]) -> Result<Self> {
        if signature.is_empty() {
            return Err(AnchorError::EmptyField("signature"));
        }
        let signatures = vec![
            DocumentField {
                property: config.signing_root_property.clone(),
                value: self.signing_root().0.to_vec(),
                salt: random_salt(),
            },
            DocumentField {
                property: config.signature_property.clone(),
                value: signature.to_vec(),
                salt: random_salt(),
            },
        ];
        let all: Vec<DocumentField> = self.fields.iter().chain(signatures.iter()).cloned().collect();
        check_unique(&all)?;

        self.signature_tree = MerkleTree::from_leaves(signatures.iter().map(DocumentField::leaf).collect());
        self.signatures = signatures;
        Ok(self)
    }

    /// Proof of a single field against the document root.
    pub fn field_proof(&self, property: &[u8]) -> Option<FieldProof> {
        let (section, tree, other_root) = if let Some(i) = position(&self.fields, property) {
            (&self.fields[i], self.data_tree.proof(i)?, self.signatures_root())
        } else {
            let i = position(&self.signatures, property)?;
            (&self.signatures[i], self.signature_tree.proof(i)?, self.signing_root())
        };

        let mut proof = tree;
        if self.is_signed() {
            proof.push(other_root);
        }
        Some(FieldProof {
            property: section.property.clone(),
            value: section.value.clone(),
            salt: section.salt,
            proof,
        })
    }

    /// Proofs for several fields, in the order requested.
    pub fn field_proofs(&self, properties: &[&[u8]]) -> Option<Vec<FieldProof>> {
        properties.iter().map(|p| self.field_proof(p)).collect()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len() + self.signatures.len()
    }
}

fn position(fields: &[DocumentField], property: &[u8]) -> Option<usize> {
    fields.iter().position(|f| f.property == property)
}
