//! Minting tokens from anchored documents.
//!
//! - `document`: provable documents and their field proofs
//! - `proof`: field leaf hashing and verification
//! - `registry`: the token registry

pub mod document;
pub mod proof;
pub mod registry;

pub use document::{random_salt, DocumentBuilder, ProvableDocument};
pub use proof::{leaf_hash, verify_fields, zip_fields, FieldProof};
pub use registry::{MintRequest, Token, TokenField, TokenRegistry};
