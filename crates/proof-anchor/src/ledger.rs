//! The ledger: every component behind one height-driven facade.
//!
//! Each mutating call takes the caller's address, runs against the
//! current height, and either appends its events to the log or fails
//! having changed nothing.

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, AnchorRepository, AnchorSource, PreAnchor};
use crate::config::LedgerConfig;
use crate::error::{AnchorError, Result};
use crate::event::{Event, EventLog, EventRecord};
use crate::identity::{
    DirectoryResolver, Identity, IdentityDirectory, IdentityFactory, IdentityStore, Purpose,
};
use crate::mint::{MintRequest, TokenRegistry};
use crate::types::{Address, Bytes32, Height, Identifier, TxContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LedgerState")]
pub struct Ledger {
    config: LedgerConfig,
    height: Height,
    identities: IdentityStore,
    directory: IdentityDirectory,
    factory: IdentityFactory,
    anchors: AnchorRepository,
    tokens: TokenRegistry,
    events: EventLog,
}

/// Deserialized form of a [`Ledger`]. Component configurations are not
/// stored and are rebuilt from `config`.
#[derive(Deserialize)]
struct LedgerState {
    config: LedgerConfig,
    height: Height,
    identities: IdentityStore,
    directory: IdentityDirectory,
    factory: IdentityFactory,
    anchors: AnchorRepository,
    tokens: TokenRegistry,
    events: EventLog,
}

impl TryFrom<LedgerState> for Ledger {
    type Error = AnchorError;

    fn try_from(state: LedgerState) -> Result<Self> {
        state.config.validate()?;
        let LedgerState {
            config,
            height,
            identities,
            directory,
            factory,
            mut anchors,
            mut tokens,
            events,
        } = state;
        anchors.set_config(config.anchor.clone());
        tokens.set_config(config.mint.clone());
        Ok(Self {
            config,
            height,
            identities,
            directory,
            factory,
            anchors,
            tokens,
            events,
        })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

fn rejected(op: &str, err: AnchorError) -> AnchorError {
    log::debug!("{op} rejected ({:?}): {err}", err.class());
    err
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            height: config.genesis_height,
            anchors: AnchorRepository::new(config.anchor.clone()),
            tokens: TokenRegistry::new(config.mint.clone()),
            identities: IdentityStore::new(),
            directory: IdentityDirectory::new(),
            factory: IdentityFactory::new(),
            events: EventLog::new(),
            config,
        }
    }

    // ── Clock ────────────────────────────────────────────────────────────────

    pub fn height(&self) -> Height {
        self.height
    }

    /// Advance the height by `blocks`.
    pub fn mine(&mut self, blocks: u64) -> Height {
        self.height = self.height.saturating_add(blocks);
        self.height
    }

    fn tx(&self, caller: Address) -> TxContext {
        TxContext::new(caller, self.height)
    }

    fn record(&mut self, caller: Address, events: Vec<Event>) -> &[EventRecord] {
        self.events.append(self.height, caller, events)
    }

    // ── Identities ───────────────────────────────────────────────────────────

    /// Create an identity owned by `caller`.
    pub fn create_identity(&mut self, caller: Address) -> Result<Address> {
        self.create_identity_for(caller, caller)
    }

    pub fn create_identity_for(&mut self, caller: Address, owner: Address) -> Result<Address> {
        let tx = self.tx(caller);
        let (address, events) = self
            .factory
            .create_identity_for(&tx, &mut self.identities, owner)
            .map_err(|e| rejected("create_identity", e))?;
        self.record(caller, events);
        Ok(address)
    }

    /// Create an identity at `address`, owned by `caller`, outside the factory.
    pub fn insert_identity(&mut self, caller: Address, address: Address) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .identities
            .create(&tx, address)
            .map_err(|e| rejected("insert_identity", e))?;
        Ok(self.record(caller, events))
    }

    pub fn add_key(&mut self, caller: Address, identity: Address, key: Bytes32, purpose: Purpose) -> Result<&[EventRecord]> {
        self.add_multi_purpose_key(caller, identity, key, &[purpose])
    }

    pub fn add_multi_purpose_key(
        &mut self,
        caller: Address,
        identity: Address,
        key: Bytes32,
        purposes: &[Purpose],
    ) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .identities
            .get_mut(&identity)
            .and_then(|id| id.add_multi_purpose_key(&tx, key, purposes))
            .map_err(|e| rejected("add_key", e))?;
        Ok(self.record(caller, events))
    }

    pub fn revoke_key(&mut self, caller: Address, identity: Address, key: Bytes32) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .identities
            .get_mut(&identity)
            .and_then(|id| id.revoke_key(&tx, key))
            .map_err(|e| rejected("revoke_key", e))?;
        Ok(self.record(caller, events))
    }

    pub fn transfer_ownership(&mut self, caller: Address, identity: Address, new_owner: Address) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .identities
            .get_mut(&identity)
            .and_then(|id| id.transfer_ownership(&tx, new_owner))
            .map_err(|e| rejected("transfer_ownership", e))?;
        Ok(self.record(caller, events))
    }

    pub fn identity(&self, address: &Address) -> Option<&Identity> {
        self.identities.get(address)
    }

    pub fn created_identity(&self, address: &Address) -> bool {
        self.factory.created_identity(address)
    }

    // ── Directory ────────────────────────────────────────────────────────────

    pub fn register_identity(&mut self, caller: Address, identifier: Identifier, identity: Address) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .directory
            .register(&tx, identifier, identity)
            .map_err(|e| rejected("register_identity", e))?;
        Ok(self.record(caller, events))
    }

    pub fn update_identity(&mut self, caller: Address, identifier: &Identifier, identity: Address) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .directory
            .update(&tx, identifier, identity)
            .map_err(|e| rejected("update_identity", e))?;
        Ok(self.record(caller, events))
    }

    /// The identity currently bound to `identifier`.
    pub fn resolve(&self, identifier: &Identifier) -> Result<&Identity> {
        DirectoryResolver::new(&self.directory, &self.identities).lookup(identifier)
    }

    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    // ── Anchors ──────────────────────────────────────────────────────────────

    pub fn pre_commit(
        &mut self,
        caller: Address,
        anchor_id: Bytes32,
        signing_root: Bytes32,
        identifier: Identifier,
        signature: &[u8],
        expiration_height: Height,
    ) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let resolver = DirectoryResolver::new(&self.directory, &self.identities);
        let events = self
            .anchors
            .pre_commit(&tx, &resolver, anchor_id, signing_root, identifier, signature, expiration_height)
            .map_err(|e| rejected("pre_commit", e))?;
        Ok(self.record(caller, events))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn commit(
        &mut self,
        caller: Address,
        anchor_id: Bytes32,
        document_root: Bytes32,
        identifier: Identifier,
        proof: &[Bytes32],
        signature: &[u8],
    ) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let resolver = DirectoryResolver::new(&self.directory, &self.identities);
        let events = self
            .anchors
            .commit(&tx, &resolver, anchor_id, document_root, identifier, proof, signature)
            .map_err(|e| rejected("commit", e))?;
        Ok(self.record(caller, events))
    }

    pub fn get_anchor_by_id(&self, anchor_id: &Bytes32) -> Anchor {
        self.anchors.get_anchor_by_id(anchor_id)
    }

    pub fn get_pre_anchor_by_id(&self, anchor_id: &Bytes32) -> PreAnchor {
        self.anchors.get_pre_anchor_by_id(anchor_id)
    }

    /// Whether a pre-commit on `anchor_id` is live at the current height.
    pub fn has_valid_pre_commit(&self, anchor_id: &Bytes32) -> bool {
        self.anchors.has_valid_pre_commit(anchor_id, self.height)
    }

    pub fn anchors(&self) -> &AnchorRepository {
        &self.anchors
    }

    // ── Tokens ───────────────────────────────────────────────────────────────

    pub fn mint(&mut self, caller: Address, request: MintRequest) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let events = self
            .tokens
            .mint(&tx, &self.anchors, request)
            .map_err(|e| rejected("mint", e))?;
        Ok(self.record(caller, events))
    }

    pub fn mint_with_identity(&mut self, caller: Address, request: MintRequest) -> Result<&[EventRecord]> {
        let tx = self.tx(caller);
        let resolver = DirectoryResolver::new(&self.directory, &self.identities);
        let events = self
            .tokens
            .mint_with_identity(&tx, &self.anchors, &resolver, request)
            .map_err(|e| rejected("mint_with_identity", e))?;
        Ok(self.record(caller, events))
    }

    pub fn is_token_latest_document(&self, token_id: &Bytes32, next_anchor_id: &Bytes32) -> Result<bool> {
        self.tokens.is_token_latest_document(&self.anchors, token_id, next_anchor_id)
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    // ── Misc ─────────────────────────────────────────────────────────────────

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}
