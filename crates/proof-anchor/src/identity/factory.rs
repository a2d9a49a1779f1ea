//! Identity factory: provisions fresh identity instances.
//!
//! An identity address is `keccak256("identity" ‖ creator ‖ nonce)[12..]`,
//! so addresses are deterministic for a given creation order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::crypto::hash::keccak256;
use crate::crypto::keys::key_of_address;
use crate::error::{AnchorError, Result};
use crate::event::Event;
use crate::types::{Address, TxContext};

use super::key_registry::{Identity, Purpose};
use super::store::IdentityStore;

const ADDRESS_DOMAIN: &[u8] = b"identity";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityFactory {
    nonce: u64,
    created: BTreeSet<Address>,
}

impl IdentityFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity owned by the caller.
    pub fn create_identity(
        &mut self,
        tx: &TxContext,
        store: &mut IdentityStore,
    ) -> Result<(Address, Vec<Event>)> {
        self.create_identity_for(tx, store, tx.caller)
    }

    /// Create an identity owned by `owner` and install `owner`'s management key.
    pub fn create_identity_for(
        &mut self,
        tx: &TxContext,
        store: &mut IdentityStore,
        owner: Address,
    ) -> Result<(Address, Vec<Event>)> {
        if owner.is_zero() {
            return Err(AnchorError::EmptyField("owner"));
        }

        let address = self.next_address(&tx.caller);
        let mut identity = Identity::new(address, owner);
        let install = TxContext::new(owner, tx.height);
        let mut events = vec![Event::IdentityCreated { identity: address, owner }];
        events.extend(identity.add_key(&install, key_of_address(&owner), Purpose::MANAGEMENT)?);

        store.insert(identity)?;
        self.nonce += 1;
        self.created.insert(address);
        log::info!("factory: created identity {address} for owner {owner}");
        Ok((address, events))
    }

    /// Whether `address` was provisioned by this factory.
    pub fn created_identity(&self, address: &Address) -> bool {
        self.created.contains(address)
    }

    pub fn created_count(&self) -> u64 {
        self.nonce
    }

    fn next_address(&self, creator: &Address) -> Address {
        let mut buf = Vec::with_capacity(ADDRESS_DOMAIN.len() + 20 + 8);
        buf.extend_from_slice(ADDRESS_DOMAIN);
        buf.extend_from_slice(&creator.0);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        let hash = keccak256(&buf);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash.0[12..]);
        Address(out)
    }
}
