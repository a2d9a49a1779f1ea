//! Resolution of an identifier to the identity that governs it.
//!
//! Anchoring and minting only need read access to identities; they take
//! an [`IdentityResolver`] rather than the directory and store directly.

use crate::error::{AnchorError, Result};
use crate::types::Identifier;

use super::directory::IdentityDirectory;
use super::key_registry::Identity;
use super::store::IdentityStore;

/// Maps an identifier to its current identity instance.
pub trait IdentityResolver {
    /// Fails with `UnknownIdentifier` if the identifier has no directory
    /// slot, or `IdentityNotFound` if the slot points nowhere.
    fn resolve(&self, identifier: &Identifier) -> Result<&Identity>;
}

/// Resolver over a directory and an identity store.
#[derive(Clone, Copy)]
pub struct DirectoryResolver<'a> {
    directory: &'a IdentityDirectory,
    store: &'a IdentityStore,
}

impl<'a> DirectoryResolver<'a> {
    pub fn new(directory: &'a IdentityDirectory, store: &'a IdentityStore) -> Self {
        Self { directory, store }
    }

    /// As [`IdentityResolver::resolve`], borrowing from the store rather
    /// than from the resolver.
    pub fn lookup(self, identifier: &Identifier) -> Result<&'a Identity> {
        let address = self
            .directory
            .identity_of(identifier)
            .ok_or_else(|| AnchorError::UnknownIdentifier(identifier.to_string()))?;
        self.store
            .get(&address)
            .ok_or_else(|| AnchorError::IdentityNotFound(address.to_string()))
    }
}

impl IdentityResolver for DirectoryResolver<'_> {
    fn resolve(&self, identifier: &Identifier) -> Result<&Identity> {
        self.lookup(identifier)
    }
}
