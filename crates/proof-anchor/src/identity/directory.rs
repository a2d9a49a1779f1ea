//! Identity directory: external identifier → identity instance.
//!
//! One slot per identifier. The caller that registers a slot owns it and
//! is the only principal allowed to repoint it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, Result};
use crate::event::Event;
use crate::types::{Address, Identifier, TxContext};

/// A directory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub identifier: Identifier,
    pub identity: Address,
    pub owner: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityDirectory {
    entries: BTreeMap<Identifier, DirectoryEntry>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `identifier` for the caller, pointing it at `identity`.
    pub fn register(
        &mut self,
        tx: &TxContext,
        identifier: Identifier,
        identity: Address,
    ) -> Result<Vec<Event>> {
        if identifier.is_empty() {
            return Err(AnchorError::EmptyField("identifier"));
        }
        if identity.is_zero() {
            return Err(AnchorError::EmptyField("identity"));
        }
        if self.entries.contains_key(&identifier) {
            return Err(AnchorError::IdentifierTaken(identifier.to_string()));
        }

        self.entries.insert(
            identifier.clone(),
            DirectoryEntry {
                identifier: identifier.clone(),
                identity,
                owner: tx.caller,
            },
        );
        log::debug!("directory: {identifier} -> {identity} (owner {})", tx.caller);
        Ok(vec![Event::IdentityRegistered {
            identifier,
            identity,
            owner: tx.caller,
        }])
    }

    /// Repoint an existing slot. Only the registering owner may do this.
    pub fn update(
        &mut self,
        tx: &TxContext,
        identifier: &Identifier,
        identity: Address,
    ) -> Result<Vec<Event>> {
        if identifier.is_empty() {
            return Err(AnchorError::EmptyField("identifier"));
        }
        if identity.is_zero() {
            return Err(AnchorError::EmptyField("identity"));
        }
        let entry = self
            .entries
            .get_mut(identifier)
            .ok_or_else(|| AnchorError::UnknownIdentifier(identifier.to_string()))?;
        if entry.owner != tx.caller {
            return Err(AnchorError::NotOwner);
        }

        let previous = entry.identity;
        entry.identity = identity;
        Ok(vec![Event::IdentityUpdated {
            identifier: identifier.clone(),
            previous,
            identity,
        }])
    }

    pub fn lookup(&self, identifier: &Identifier) -> Option<&DirectoryEntry> {
        self.entries.get(identifier)
    }

    pub fn identity_of(&self, identifier: &Identifier) -> Option<Address> {
        self.entries.get(identifier).map(|e| e.identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
