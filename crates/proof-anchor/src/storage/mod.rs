//! Storage layer for ledger snapshots.
//!
//! # Modules
//!
//! - [`snapshot`]: whole-ledger JSON snapshots with a versioned wrapper.

pub mod snapshot;

pub use snapshot::{load_snapshot, save_snapshot, snapshot_from_json, snapshot_to_json};
