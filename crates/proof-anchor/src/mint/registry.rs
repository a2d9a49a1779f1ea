//! Token registry: one token per anchored document.
//!
//! A mint proves selected document fields against an anchored root. The
//! identity-aware mint additionally proves that the document was signed
//! by a key its issuer identity held for signing when the anchor was
//! committed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, AnchorSource};
use crate::config::MintConfig;
use crate::crypto::signing::{recover_public_key_from_consensus_signature, NO_SIGNER};
use crate::error::{AnchorError, Result};
use crate::event::Event;
use crate::identity::{IdentityResolver, Purpose};
use crate::types::{Address, Bytes32, Height, TxContext};

use super::proof::{verify_fields, zip_fields, FieldProof};

/// A proven `(property, value)` pair carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenField {
    #[serde(with = "crate::types::hex_bytes")]
    pub property: Vec<u8>,
    #[serde(with = "crate::types::hex_bytes")]
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_id: Bytes32,
    pub owner: Address,
    pub anchor_id: Bytes32,
    pub document_root: Bytes32,
    /// Commit height of the anchor the token was minted against.
    pub anchored_at: Height,
    pub minted_at: Height,
    pub uri: String,
    pub fields: Vec<TokenField>,
}

impl Token {
    /// Value of a proven field, if the token carries it.
    pub fn field(&self, property: &[u8]) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|f| f.property == property)
            .map(|f| f.value.as_slice())
    }
}

/// Arguments of a mint. Fields arrive as positional arrays, one entry
/// per proven field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub recipient: Address,
    pub token_id: Bytes32,
    pub anchor_id: Bytes32,
    pub document_root: Bytes32,
    pub properties: Vec<Vec<u8>>,
    pub values: Vec<Vec<u8>>,
    pub salts: Vec<Bytes32>,
    pub proofs: Vec<Vec<Bytes32>>,
}

impl MintRequest {
    pub fn new(recipient: Address, token_id: Bytes32, anchor_id: Bytes32, document_root: Bytes32) -> Self {
        Self {
            recipient,
            token_id,
            anchor_id,
            document_root,
            ..Self::default()
        }
    }

    /// Append one proven field.
    pub fn with_field(mut self, field: FieldProof) -> Self {
        self.properties.push(field.property);
        self.values.push(field.value);
        self.salts.push(field.salt);
        self.proofs.push(field.proof);
        self
    }

    pub fn with_fields(self, fields: impl IntoIterator<Item = FieldProof>) -> Self {
        fields.into_iter().fold(self, Self::with_field)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRegistry {
    #[serde(skip)]
    config: MintConfig,
    tokens: BTreeMap<Bytes32, Token>,
    by_anchor: BTreeMap<Bytes32, Bytes32>,
}

impl TokenRegistry {
    pub fn new(config: MintConfig) -> Self {
        Self {
            config,
            tokens: BTreeMap::new(),
            by_anchor: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: MintConfig) {
        self.config = config;
    }

    /// Mint `request.token_id` to `request.recipient` against an anchored root.
    pub fn mint<A: AnchorSource>(&mut self, tx: &TxContext, anchors: &A, request: MintRequest) -> Result<Vec<Event>> {
        let (anchor, fields, request) = self.check_mint(anchors, request)?;
        Ok(self.insert(tx, &anchor, request, fields))
    }

    /// As [`Self::mint`], and the document must carry a signature over its
    /// signing root by a `SIGNING` key of the anchor identifier's identity
    /// that was not revoked at or before the anchor's commit height.
    ///
    /// The sender must act for that identity: `tx.caller` is either the
    /// identity's own address or its owner.
    pub fn mint_with_identity<A: AnchorSource, R: IdentityResolver>(
        &mut self,
        tx: &TxContext,
        anchors: &A,
        resolver: &R,
        request: MintRequest,
    ) -> Result<Vec<Event>> {
        let (anchor, fields, request) = self.check_mint(anchors, request)?;
        self.require_signed_by_identity(tx, &anchor, &fields, resolver)?;
        Ok(self.insert(tx, &anchor, request, fields))
    }

    fn check_mint<A: AnchorSource>(
        &self,
        anchors: &A,
        mut request: MintRequest,
    ) -> Result<(Anchor, Vec<FieldProof>, MintRequest)> {
        if request.recipient.is_zero() {
            return Err(AnchorError::EmptyField("recipient"));
        }
        if request.token_id.is_zero() {
            return Err(AnchorError::EmptyField("token_id"));
        }
        if request.anchor_id.is_zero() {
            return Err(AnchorError::EmptyField("anchor_id"));
        }
        if request.document_root.is_zero() {
            return Err(AnchorError::EmptyField("document_root"));
        }
        let fields = zip_fields(
            std::mem::take(&mut request.properties),
            std::mem::take(&mut request.values),
            std::mem::take(&mut request.salts),
            std::mem::take(&mut request.proofs),
        )?;

        let anchor = anchors
            .find_anchor(&request.anchor_id)
            .cloned()
            .ok_or(AnchorError::AnchorNotFound(request.anchor_id))?;
        if anchor.document_root != request.document_root {
            log::debug!(
                "mint {}: claimed root {} differs from anchored {}",
                request.token_id,
                request.document_root,
                anchor.document_root
            );
            return Err(AnchorError::RootMismatch);
        }
        if self.by_anchor.contains_key(&anchor.anchor_id) {
            return Err(AnchorError::TokenAlreadyMinted(anchor.anchor_id));
        }
        if self.tokens.contains_key(&request.token_id) {
            return Err(AnchorError::TokenIdTaken(request.token_id));
        }

        verify_fields(&fields, &anchor.document_root)?;
        Ok((anchor, fields, request))
    }

    fn require_signed_by_identity<R: IdentityResolver>(
        &self,
        tx: &TxContext,
        anchor: &Anchor,
        fields: &[FieldProof],
        resolver: &R,
    ) -> Result<()> {
        let identity = resolver.resolve(&anchor.identifier)?;
        if tx.caller != identity.address() && tx.caller != identity.owner() {
            return Err(AnchorError::SenderNotIdentity(tx.caller));
        }

        let signing_root_field = find_field(fields, &self.config.signing_root_property)?;
        let signature_field = find_field(fields, &self.config.signature_property)?;
        let signing_root = signing_root_value(&signing_root_field.value)?;

        let signer = recover_public_key_from_consensus_signature(&signature_field.value, &signing_root);
        if signer == NO_SIGNER {
            return Err(AnchorError::SignatureInvalid);
        }

        let record = identity
            .get_key(&signer)
            .filter(|r| r.has_purpose(Purpose::SIGNING))
            .ok_or(AnchorError::SignerNotInIdentity(signer))?;
        if !record.was_active_at(anchor.committed_at) {
            log::debug!(
                "mint against {}: signer {signer} revoked at {} before anchoring at {}",
                anchor.anchor_id,
                record.revoked_at,
                anchor.committed_at
            );
            return Err(AnchorError::KeyRevokedAtSigning {
                key: signer,
                revoked_at: record.revoked_at,
                anchored_at: anchor.committed_at,
            });
        }
        Ok(())
    }

    fn insert(&mut self, tx: &TxContext, anchor: &Anchor, request: MintRequest, fields: Vec<FieldProof>) -> Vec<Event> {
        let token_id = request.token_id;
        let token = Token {
            token_id,
            owner: request.recipient,
            anchor_id: anchor.anchor_id,
            document_root: anchor.document_root,
            anchored_at: anchor.committed_at,
            minted_at: tx.height,
            uri: format!("{}{}", self.config.token_uri_base, hex::encode(token_id.0)),
            fields: fields
                .into_iter()
                .map(|f| TokenField {
                    property: f.property,
                    value: f.value,
                })
                .collect(),
        };
        self.by_anchor.insert(anchor.anchor_id, token_id);
        self.tokens.insert(token_id, token);
        log::info!(
            "token {token_id} minted to {} for anchor {}",
            request.recipient,
            anchor.anchor_id
        );
        vec![Event::TokenMinted {
            token_id,
            owner: request.recipient,
            anchor_id: anchor.anchor_id,
            document_root: anchor.document_root,
        }]
    }

    /// Whether the token's document has not been superseded under
    /// `next_anchor_id`.
    ///
    /// The token is stale once an anchor exists under `next_anchor_id`
    /// that was committed no earlier than the token's own anchor.
    pub fn is_token_latest_document<A: AnchorSource>(
        &self,
        anchors: &A,
        token_id: &Bytes32,
        next_anchor_id: &Bytes32,
    ) -> Result<bool> {
        let token = self.tokens.get(token_id).ok_or(AnchorError::TokenNotFound(*token_id))?;
        if *next_anchor_id == token.anchor_id {
            return Err(AnchorError::InvalidInput(
                "next anchor id must differ from the token's anchor".into(),
            ));
        }
        Ok(match anchors.find_anchor(next_anchor_id) {
            Some(next) => next.committed_at < token.anchored_at,
            None => true,
        })
    }

    pub fn token(&self, token_id: &Bytes32) -> Option<&Token> {
        self.tokens.get(token_id)
    }

    pub fn owner_of(&self, token_id: &Bytes32) -> Option<Address> {
        self.tokens.get(token_id).map(|t| t.owner)
    }

    /// The token minted against `anchor_id`, if any.
    pub fn token_by_anchor(&self, anchor_id: &Bytes32) -> Option<&Token> {
        self.by_anchor.get(anchor_id).and_then(|id| self.tokens.get(id))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn find_field<'a>(fields: &'a [FieldProof], property: &[u8]) -> Result<&'a FieldProof> {
    fields
        .iter()
        .find(|f| f.property == property)
        .ok_or_else(|| AnchorError::MissingField(String::from_utf8_lossy(property).into_owned()))
}

fn signing_root_value(value: &[u8]) -> Result<Bytes32> {
    let bytes: [u8; 32] = value.try_into().map_err(|_| {
        AnchorError::InvalidInput(format!("signing root field is {} bytes, expected 32", value.len()))
    })?;
    Ok(Bytes32(bytes))
}
