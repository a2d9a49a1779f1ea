//! Arena of identity instances keyed by address.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::keys::key_of_address;
use crate::error::{AnchorError, Result};
use crate::event::Event;
use crate::types::{Address, TxContext};

use super::key_registry::{Identity, Purpose};

/// Every identity instance known to the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityStore {
    identities: BTreeMap<Address, Identity>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new identity. Its address must be free.
    pub fn insert(&mut self, identity: Identity) -> Result<()> {
        let address = identity.address();
        if address.is_zero() {
            return Err(AnchorError::EmptyField("identity"));
        }
        if self.identities.contains_key(&address) {
            return Err(AnchorError::InvalidInput(format!(
                "identity already exists at {address}"
            )));
        }
        self.identities.insert(address, identity);
        Ok(())
    }

    /// Create an identity at `address` owned by `tx.caller` without the
    /// factory. The owner's MANAGEMENT key is installed as on factory creation.
    pub fn create(&mut self, tx: &TxContext, address: Address) -> Result<Vec<Event>> {
        if tx.caller.is_zero() {
            return Err(AnchorError::EmptyField("owner"));
        }
        let mut identity = Identity::new(address, tx.caller);
        let mut events = vec![Event::IdentityCreated {
            identity: address,
            owner: tx.caller,
        }];
        events.extend(identity.add_key(tx, key_of_address(&tx.caller), Purpose::MANAGEMENT)?);
        self.insert(identity)?;
        log::info!("identity {address} created directly by {}", tx.caller);
        Ok(events)
    }

    pub fn get(&self, address: &Address) -> Option<&Identity> {
        self.identities.get(address)
    }

    /// Mutable access, failing with `IdentityNotFound` for unknown addresses.
    pub fn get_mut(&mut self, address: &Address) -> Result<&mut Identity> {
        self.identities
            .get_mut(address)
            .ok_or_else(|| AnchorError::IdentityNotFound(address.to_string()))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.identities.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
