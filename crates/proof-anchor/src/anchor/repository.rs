//! Anchor repository: two-phase anchoring of document roots.
//!
//! Per anchor id the state moves `Empty → PreCommitted → Committed`.
//! `Committed` is terminal. A pre-commit becomes inert once the current
//! height reaches its expiration height; its slot may then be overwritten
//! by a fresh pre-commit, but it can never be finalized.
//!
//! A commit is also accepted with no pre-commit at all. In that case the
//! proof linking a signing root to the document root is not checked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnchorConfig;
use crate::crypto::merkle::verify_proof;
use crate::error::{AnchorError, Result};
use crate::event::Event;
use crate::identity::IdentityResolver;
use crate::types::{Bytes32, Height, Identifier, TxContext};

use super::message::{commit_digest, pre_commit_digest};

/// A time-boxed reservation of an anchor slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAnchor {
    pub anchor_id: Bytes32,
    pub signing_root: Bytes32,
    pub identifier: Identifier,
    pub expiration_height: Height,
}

impl PreAnchor {
    /// Live strictly before the expiration height.
    pub fn is_live_at(&self, height: Height) -> bool {
        height < self.expiration_height
    }
}

/// An immutable commitment of a document root.
///
/// The `Default` value (zero root, empty identifier, height 0) is what
/// [`AnchorRepository::get_anchor_by_id`] returns for unknown ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub anchor_id: Bytes32,
    pub document_root: Bytes32,
    pub identifier: Identifier,
    pub committed_at: Height,
}

/// Read access to committed anchors.
pub trait AnchorSource {
    fn find_anchor(&self, anchor_id: &Bytes32) -> Option<&Anchor>;

    /// The anchor for `anchor_id`, or a zeroed record echoing the id.
    fn get_anchor_by_id(&self, anchor_id: &Bytes32) -> Anchor {
        self.find_anchor(anchor_id).cloned().unwrap_or_else(|| Anchor {
            anchor_id: *anchor_id,
            ..Anchor::default()
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnchorRepository {
    #[serde(skip)]
    config: AnchorConfig,
    pre_anchors: BTreeMap<Bytes32, PreAnchor>,
    anchors: BTreeMap<Bytes32, Anchor>,
}

impl AnchorRepository {
    pub fn new(config: AnchorConfig) -> Self {
        Self {
            config,
            pre_anchors: BTreeMap::new(),
            anchors: BTreeMap::new(),
        }
    }

    /// Reserve `anchor_id` until `expiration_height`.
    ///
    /// The signature must be a personal-scheme signature over
    /// `anchor_id ‖ signing_root ‖ identifier ‖ expiration_height` by a live
    /// authentication key of the identity bound to `identifier`.
    #[allow(clippy::too_many_arguments)]
    pub fn pre_commit<R: IdentityResolver>(
        &mut self,
        tx: &TxContext,
        resolver: &R,
        anchor_id: Bytes32,
        signing_root: Bytes32,
        identifier: Identifier,
        signature: &[u8],
        expiration_height: Height,
    ) -> Result<Vec<Event>> {
        if anchor_id.is_zero() {
            return Err(AnchorError::EmptyField("anchor_id"));
        }
        if signing_root.is_zero() {
            return Err(AnchorError::EmptyField("signing_root"));
        }
        if identifier.is_empty() {
            return Err(AnchorError::EmptyField("identifier"));
        }
        if signature.is_empty() {
            return Err(AnchorError::EmptyField("signature"));
        }
        if expiration_height == 0 {
            return Err(AnchorError::EmptyField("expiration_height"));
        }
        if expiration_height <= tx.height {
            return Err(AnchorError::ExpirationNotInFuture {
                expiration: expiration_height,
                height: tx.height,
            });
        }
        let limit = tx.height.saturating_add(self.config.max_pre_commit_window);
        if expiration_height > limit {
            return Err(AnchorError::ExpirationTooFar {
                expiration: expiration_height,
                limit,
            });
        }

        if self.anchors.contains_key(&anchor_id) {
            return Err(AnchorError::AlreadyCommitted(anchor_id));
        }
        if let Some(existing) = self.pre_anchors.get(&anchor_id) {
            if existing.is_live_at(tx.height) {
                return Err(AnchorError::PreCommitActive {
                    anchor_id,
                    expiration: existing.expiration_height,
                });
            }
        }

        let identity = resolver.resolve(&identifier)?;
        let digest = pre_commit_digest(&anchor_id, &signing_root, &identifier, expiration_height);
        if !identity.is_signature_valid(&digest, signature) {
            log::debug!("pre-commit {anchor_id}: signature rejected for {identifier}");
            return Err(AnchorError::SignatureInvalid);
        }

        self.pre_anchors.insert(
            anchor_id,
            PreAnchor {
                anchor_id,
                signing_root,
                identifier: identifier.clone(),
                expiration_height,
            },
        );
        log::debug!("pre-commit {anchor_id} by {identifier} until {expiration_height}");
        Ok(vec![Event::AnchorPreCommitted {
            anchor_id,
            signing_root,
            identifier,
            expiration_height,
        }])
    }

    /// Commit `document_root` under `anchor_id`. Succeeds at most once per id.
    ///
    /// The signature must be a personal-scheme signature over
    /// `anchor_id ‖ document_root ‖ identifier`. If a pre-commit exists it
    /// must be live, carry the same identifier, and its signing root must
    /// fold through `proof` to `document_root`.
    #[allow(clippy::too_many_arguments)]
    pub fn commit<R: IdentityResolver>(
        &mut self,
        tx: &TxContext,
        resolver: &R,
        anchor_id: Bytes32,
        document_root: Bytes32,
        identifier: Identifier,
        proof: &[Bytes32],
        signature: &[u8],
    ) -> Result<Vec<Event>> {
        if anchor_id.is_zero() {
            return Err(AnchorError::EmptyField("anchor_id"));
        }
        if document_root.is_zero() {
            return Err(AnchorError::EmptyField("document_root"));
        }
        if identifier.is_empty() {
            return Err(AnchorError::EmptyField("identifier"));
        }
        if signature.is_empty() {
            return Err(AnchorError::EmptyField("signature"));
        }

        if self.anchors.contains_key(&anchor_id) {
            log::debug!("commit {anchor_id}: already committed");
            return Err(AnchorError::AlreadyCommitted(anchor_id));
        }

        let identity = resolver.resolve(&identifier)?;
        let digest = commit_digest(&anchor_id, &document_root, &identifier);
        if !identity.is_signature_valid(&digest, signature) {
            log::debug!("commit {anchor_id}: signature rejected for {identifier}");
            return Err(AnchorError::SignatureInvalid);
        }

        if let Some(pre) = self.pre_anchors.get(&anchor_id) {
            if !pre.is_live_at(tx.height) {
                return Err(AnchorError::PreCommitExpired {
                    anchor_id,
                    expiration: pre.expiration_height,
                });
            }
            if pre.identifier != identifier {
                return Err(AnchorError::DifferentIdentifier);
            }
            if !verify_proof(proof, &document_root, &pre.signing_root) {
                return Err(AnchorError::SigningRootNotInDocument);
            }
        }

        self.pre_anchors.remove(&anchor_id);
        self.anchors.insert(
            anchor_id,
            Anchor {
                anchor_id,
                document_root,
                identifier: identifier.clone(),
                committed_at: tx.height,
            },
        );
        log::info!("anchor {anchor_id} committed at {} root {document_root}", tx.height);
        Ok(vec![Event::AnchorCommitted {
            anchor_id,
            document_root,
            identifier,
            committed_at: tx.height,
        }])
    }

    /// The pre-commit slot for `anchor_id`, live or not.
    pub fn find_pre_anchor(&self, anchor_id: &Bytes32) -> Option<&PreAnchor> {
        self.pre_anchors.get(anchor_id)
    }

    /// The pre-commit for `anchor_id`, or a zeroed record echoing the id.
    pub fn get_pre_anchor_by_id(&self, anchor_id: &Bytes32) -> PreAnchor {
        self.pre_anchors.get(anchor_id).cloned().unwrap_or_else(|| PreAnchor {
            anchor_id: *anchor_id,
            ..PreAnchor::default()
        })
    }

    /// Whether a live pre-commit holds `anchor_id` at `height`.
    pub fn has_valid_pre_commit(&self, anchor_id: &Bytes32, height: Height) -> bool {
        self.pre_anchors
            .get(anchor_id)
            .map(|p| p.is_live_at(height))
            .unwrap_or(false)
    }

    pub fn has_anchor(&self, anchor_id: &Bytes32) -> bool {
        self.anchors.contains_key(anchor_id)
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: AnchorConfig) {
        self.config = config;
    }
}

impl AnchorSource for AnchorRepository {
    fn find_anchor(&self, anchor_id: &Bytes32) -> Option<&Anchor> {
        self.anchors.get(anchor_id)
    }
}
