//! Ledger snapshots: persist and restore the whole ledger as JSON.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "ledger": { ... Ledger ... }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, Result};
use crate::ledger::Ledger;

// ── File format constants ─────────────────────────────────────────────────────

const SNAPSHOT_FILE_VERSION: u32 = 1;

// ── On-disk structure ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    ledger: &'a Ledger,
}

#[derive(Deserialize)]
struct SnapshotFile {
    version: u32,
    ledger: Ledger,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serialize `ledger` into the snapshot JSON format.
pub fn snapshot_to_json(ledger: &Ledger) -> Result<String> {
    let file = SnapshotRef {
        version: SNAPSHOT_FILE_VERSION,
        ledger,
    };
    serde_json::to_string_pretty(&file).map_err(|e| AnchorError::SerializationError(e.to_string()))
}

/// Parse a snapshot produced by [`snapshot_to_json`].
///
/// # Errors
///
/// Returns `AnchorError::InvalidFileFormat` if the JSON cannot be parsed,
/// carries an unsupported version, or holds an invalid configuration.
pub fn snapshot_from_json(json: &str) -> Result<Ledger> {
    let file: SnapshotFile = serde_json::from_str(json)
        .map_err(|e| AnchorError::InvalidFileFormat(format!("failed to parse snapshot: {e}")))?;
    if file.version != SNAPSHOT_FILE_VERSION {
        return Err(AnchorError::InvalidFileFormat(format!(
            "unsupported snapshot version: {}",
            file.version
        )));
    }
    Ok(file.ledger)
}

/// Write a snapshot of `ledger` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns `AnchorError::SerializationError` if serialization fails, or
/// `AnchorError::Io` for filesystem errors.
pub fn save_snapshot(path: impl AsRef<Path>, ledger: &Ledger) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = snapshot_to_json(ledger)?;
    std::fs::write(path, json.as_bytes())?;
    log::debug!("snapshot at height {} written to {}", ledger.height(), path.display());
    Ok(())
}

/// Load a ledger from a snapshot file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Ledger> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let ledger = snapshot_from_json(&json)?;
    log::debug!("snapshot at height {} loaded from {}", ledger.height(), path.display());
    Ok(ledger)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
