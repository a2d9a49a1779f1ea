//! Append-only audit log of state transitions.
//!
//! Components return the events a successful call produced; the ledger
//! stamps them with a sequence number, the height and the caller, and
//! appends them. A failed call appends nothing.

use serde::{Deserialize, Serialize};

use crate::identity::Purpose;
use crate::types::{Address, Bytes32, Height, Identifier};

/// A structured state-change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    IdentityCreated {
        identity: Address,
        owner: Address,
    },
    KeyAdded {
        identity: Address,
        key: Bytes32,
        purpose: Purpose,
    },
    KeyRevoked {
        identity: Address,
        key: Bytes32,
        revoked_at: Height,
    },
    OwnershipTransferred {
        identity: Address,
        previous_owner: Address,
        new_owner: Address,
    },
    IdentityRegistered {
        identifier: Identifier,
        identity: Address,
        owner: Address,
    },
    IdentityUpdated {
        identifier: Identifier,
        previous: Address,
        identity: Address,
    },
    AnchorPreCommitted {
        anchor_id: Bytes32,
        signing_root: Bytes32,
        identifier: Identifier,
        expiration_height: Height,
    },
    AnchorCommitted {
        anchor_id: Bytes32,
        document_root: Bytes32,
        identifier: Identifier,
        committed_at: Height,
    },
    TokenMinted {
        token_id: Bytes32,
        owner: Address,
        anchor_id: Bytes32,
        document_root: Bytes32,
    },
}

impl Event {
    /// Stable tag, matching the serialized `type` field.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::IdentityCreated { .. } => "identity_created",
            Self::KeyAdded { .. } => "key_added",
            Self::KeyRevoked { .. } => "key_revoked",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::IdentityRegistered { .. } => "identity_registered",
            Self::IdentityUpdated { .. } => "identity_updated",
            Self::AnchorPreCommitted { .. } => "anchor_pre_committed",
            Self::AnchorCommitted { .. } => "anchor_committed",
            Self::TokenMinted { .. } => "token_minted",
        }
    }

    /// The anchor this event concerns, if any.
    pub fn anchor_id(&self) -> Option<&Bytes32> {
        match self {
            Self::AnchorPreCommitted { anchor_id, .. }
            | Self::AnchorCommitted { anchor_id, .. }
            | Self::TokenMinted { anchor_id, .. } => Some(anchor_id),
            _ => None,
        }
    }
}

/// An event stamped with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub height: Height,
    pub caller: Address,
    pub event: Event,
}

/// The append-only log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one call's events in order. Returns the records written.
    pub fn append(&mut self, height: Height, caller: Address, events: Vec<Event>) -> &[EventRecord] {
        let start = self.records.len();
        for event in events {
            let seq = self.records.len() as u64;
            self.records.push(EventRecord {
                seq,
                height,
                caller,
                event,
            });
        }
        &self.records[start..]
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records with `seq >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    /// All records mentioning `anchor_id`, oldest first.
    pub fn for_anchor(&self, anchor_id: &Bytes32) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.anchor_id() == Some(anchor_id))
            .collect()
    }

    /// All records with the given tag, oldest first.
    pub fn by_tag(&self, tag: &str) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.as_tag() == tag)
            .collect()
    }
}
