//! Identity management: keys, directory, factory.
//!
//! An [`Identity`] holds purpose-scoped keys under a single owner. The
//! [`IdentityDirectory`] maps external identifiers to identity addresses,
//! and the [`IdentityFactory`] provisions new identities.

pub mod directory;
pub mod factory;
pub mod key_registry;
pub mod resolver;
pub mod store;

pub use directory::{DirectoryEntry, IdentityDirectory};
pub use factory::IdentityFactory;
pub use key_registry::{Identity, KeyRecord, Purpose};
pub use resolver::{DirectoryResolver, IdentityResolver};
pub use store::IdentityStore;
