//! Purpose-scoped key registry of a single identity.
//!
//! Keys are `bytes32` values (see [`key_of_address`]) tagged with one or
//! more purposes. Revocation stamps the current height on the record and
//! is never undone. Past facts stay valid: a key revoked at height `r`
//! was still live at every height below `r`.
//!
//! [`key_of_address`]: crate::crypto::keys::key_of_address

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::signing::{recover_personal, NO_SIGNER};
use crate::error::{AnchorError, Result};
use crate::event::Event;
use crate::types::{Address, Bytes32, Height, TxContext};

/// Tag restricting what a key may authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Purpose(pub u64);

impl Purpose {
    /// May manage the identity.
    pub const MANAGEMENT: Self = Self(1);
    /// May execute actions on behalf of the identity.
    pub const ACTION: Self = Self(2);
    /// May authorize anchoring.
    pub const AUTHENTICATION: Self = Self(3);
    /// May sign documents.
    pub const SIGNING: Self = Self(4);

    /// Human-readable name of a well-known purpose.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            1 => "management",
            2 => "action",
            3 => "authentication",
            4 => "signing",
            _ => "custom",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.0)
    }
}

/// A registered key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub key: Bytes32,
    pub purposes: BTreeSet<Purpose>,
    /// Height of revocation; `0` while active.
    pub revoked_at: Height,
}

impl KeyRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at > 0
    }

    pub fn has_purpose(&self, purpose: Purpose) -> bool {
        self.purposes.contains(&purpose)
    }

    /// Whether the key was live at `height`.
    pub fn was_active_at(&self, height: Height) -> bool {
        self.revoked_at == 0 || self.revoked_at > height
    }
}

/// An identity: an owner and its purpose-scoped keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    address: Address,
    owner: Address,
    keys: BTreeMap<Bytes32, KeyRecord>,
}

impl Identity {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            keys: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    fn require_owner(&self, tx: &TxContext) -> Result<()> {
        if tx.caller != self.owner {
            log::debug!("identity {}: caller {} is not owner", self.address, tx.caller);
            return Err(AnchorError::NotOwner);
        }
        Ok(())
    }

    /// Add `purpose` to `key`.
    pub fn add_key(&mut self, tx: &TxContext, key: Bytes32, purpose: Purpose) -> Result<Vec<Event>> {
        self.add_multi_purpose_key(tx, key, &[purpose])
    }

    /// Add every purpose in `purposes` to `key`.
    ///
    /// Purposes the key already holds are skipped; an event is emitted only
    /// for each purpose that is genuinely new.
    pub fn add_multi_purpose_key(
        &mut self,
        tx: &TxContext,
        key: Bytes32,
        purposes: &[Purpose],
    ) -> Result<Vec<Event>> {
        self.require_owner(tx)?;
        if key.is_zero() {
            return Err(AnchorError::EmptyField("key"));
        }
        if purposes.is_empty() {
            return Err(AnchorError::EmptyPurposes);
        }

        let existing = self.keys.get(&key);
        if existing.map(KeyRecord::is_revoked).unwrap_or(false) {
            return Err(AnchorError::KeyAlreadyRevoked(key));
        }

        let mut fresh: Vec<Purpose> = Vec::new();
        for purpose in purposes {
            let held = existing.map(|r| r.has_purpose(*purpose)).unwrap_or(false);
            if !held && !fresh.contains(purpose) {
                fresh.push(*purpose);
            }
        }

        if fresh.is_empty() {
            return Ok(Vec::new());
        }

        let record = self.keys.entry(key).or_insert_with(|| KeyRecord {
            key,
            purposes: BTreeSet::new(),
            revoked_at: 0,
        });
        record.purposes.extend(fresh.iter().copied());

        Ok(fresh
            .into_iter()
            .map(|purpose| Event::KeyAdded {
                identity: self.address,
                key,
                purpose,
            })
            .collect())
    }

    /// Revoke `key` at the current height.
    pub fn revoke_key(&mut self, tx: &TxContext, key: Bytes32) -> Result<Vec<Event>> {
        self.require_owner(tx)?;
        let record = self.keys.get_mut(&key).ok_or(AnchorError::KeyNotFound(key))?;
        if record.is_revoked() {
            return Err(AnchorError::KeyAlreadyRevoked(key));
        }
        record.revoked_at = tx.height;
        log::info!("identity {}: key {key} revoked at {}", self.address, tx.height);
        Ok(vec![Event::KeyRevoked {
            identity: self.address,
            key,
            revoked_at: tx.height,
        }])
    }

    /// Hand the identity to `new_owner`.
    pub fn transfer_ownership(&mut self, tx: &TxContext, new_owner: Address) -> Result<Vec<Event>> {
        self.require_owner(tx)?;
        if new_owner.is_zero() {
            return Err(AnchorError::EmptyField("new_owner"));
        }
        let previous_owner = self.owner;
        self.owner = new_owner;
        Ok(vec![Event::OwnershipTransferred {
            identity: self.address,
            previous_owner,
            new_owner,
        }])
    }

    /// Look up a key record.
    pub fn get_key(&self, key: &Bytes32) -> Option<&KeyRecord> {
        self.keys.get(key)
    }

    /// Every key holding `purpose`, revoked or not, in key order.
    pub fn get_keys_by_purpose(&self, purpose: Purpose) -> Vec<Bytes32> {
        self.keys
            .values()
            .filter(|r| r.has_purpose(purpose))
            .map(|r| r.key)
            .collect()
    }

    /// Registered, holds `purpose`, and not revoked now.
    pub fn is_key_valid(&self, key: &Bytes32, purpose: Purpose) -> bool {
        self.keys
            .get(key)
            .map(|r| r.has_purpose(purpose) && !r.is_revoked())
            .unwrap_or(false)
    }

    /// Registered, holds `purpose`, and was not yet revoked at `height`.
    pub fn is_key_valid_at(&self, key: &Bytes32, purpose: Purpose, height: Height) -> bool {
        self.keys
            .get(key)
            .map(|r| r.has_purpose(purpose) && r.was_active_at(height))
            .unwrap_or(false)
    }

    /// Whether a personal-scheme `signature` over `digest` recovers to a
    /// live authentication key. Uses current revocation state.
    pub fn is_signature_valid(&self, digest: &Bytes32, signature: &[u8]) -> bool {
        self.is_signature_valid_for(digest, signature, Purpose::AUTHENTICATION)
    }

    /// As [`Self::is_signature_valid`] for an arbitrary purpose.
    pub fn is_signature_valid_for(&self, digest: &Bytes32, signature: &[u8], purpose: Purpose) -> bool {
        let signer = recover_personal(digest, signature);
        if signer == NO_SIGNER {
            return false;
        }
        self.is_key_valid(&signer, purpose)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}
