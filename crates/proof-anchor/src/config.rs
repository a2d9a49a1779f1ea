//! Ledger configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```json
//! { "anchor": { "max_pre_commit_window": 15 }, "mint": { "token_uri_base": "https://tokens/" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, Result};
use crate::types::Height;

/// Default pre-commit validity window, in heights.
pub const DEFAULT_PRE_COMMIT_WINDOW: u64 = 480;

/// Default property path of the proven signing-root field.
pub const DEFAULT_SIGNING_ROOT_PROPERTY: &[u8] = b"document.signing_root";

/// Default property path of the proven signature field.
pub const DEFAULT_SIGNATURE_PROPERTY: &[u8] = b"document.signature";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Height the ledger starts at.
    pub genesis_height: Height,
    pub anchor: AnchorConfig,
    pub mint: MintConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            genesis_height: 1,
            anchor: AnchorConfig::default(),
            mint: MintConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// A pre-commit may expire at most this many heights after it is made.
    pub max_pre_commit_window: u64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            max_pre_commit_window: DEFAULT_PRE_COMMIT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    /// Token URI is this prefix followed by the hex token id.
    pub token_uri_base: String,
    /// Property path of the signing-root field in identity-aware mints.
    #[serde(with = "crate::types::hex_bytes")]
    pub signing_root_property: Vec<u8>,
    /// Property path of the signature field in identity-aware mints.
    #[serde(with = "crate::types::hex_bytes")]
    pub signature_property: Vec<u8>,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            token_uri_base: String::new(),
            signing_root_property: DEFAULT_SIGNING_ROOT_PROPERTY.to_vec(),
            signature_property: DEFAULT_SIGNATURE_PROPERTY.to_vec(),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnchorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.anchor.max_pre_commit_window == 0 {
            return Err(AnchorError::InvalidConfig(
                "max_pre_commit_window must be positive".into(),
            ));
        }
        if self.mint.signing_root_property.is_empty() || self.mint.signature_property.is_empty() {
            return Err(AnchorError::InvalidConfig(
                "mint property paths must not be empty".into(),
            ));
        }
        if self.mint.signing_root_property == self.mint.signature_property {
            return Err(AnchorError::InvalidConfig(
                "signing root and signature properties must differ".into(),
            ));
        }
        Ok(())
    }
}
