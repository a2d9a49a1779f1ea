//! Two-phase anchoring of document roots.
//!
//! The anchor module provides:
//! - Signing-message composition for pre-commit and commit
//! - The pre-commit / commit state machine with replay protection
//! - The [`AnchorSource`] read seam used by minting

pub mod message;
pub mod repository;

pub use message::{commit_digest, commit_message, pre_commit_digest, pre_commit_message};
pub use repository::{Anchor, AnchorRepository, AnchorSource, PreAnchor};
