//! proof-anchor: document anchoring with purpose-scoped identity keys.
//!
//! Identities hold secp256k1 keys tagged by purpose and revocable at a
//! height. Document roots are anchored in two phases (a time-boxed
//! pre-commit, then a single commit) authorized by an identity's keys.
//! Anchored documents back uniqueness tokens minted by proving selected
//! fields against the anchored root.
//!
//! All components run on an explicit, monotonic height clock driven by
//! [`Ledger`].

pub mod anchor;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod event;
pub mod identity;
pub mod ledger;
pub mod mint;
pub mod storage;
pub mod types;

// Re-export primary types
pub use anchor::{Anchor, AnchorRepository, AnchorSource, PreAnchor};
pub use config::{AnchorConfig, LedgerConfig, MintConfig};
pub use error::{AnchorError, ErrorClass, Result};
pub use event::{Event, EventLog, EventRecord};
pub use identity::{
    DirectoryResolver, Identity, IdentityDirectory, IdentityFactory, IdentityResolver, IdentityStore, KeyRecord,
    Purpose,
};
pub use ledger::Ledger;
pub use mint::{DocumentBuilder, FieldProof, MintRequest, ProvableDocument, Token, TokenRegistry};
pub use types::{Address, Bytes32, Height, Identifier, TxContext};

// Re-export crypto entry points
pub use crypto::keys::Secp256k1KeyPair;
pub use crypto::signing::{recover_public_key_from_consensus_signature, sign_consensus, sign_personal, NO_SIGNER};
