//! Error types for proof-anchor.
//!
//! Every rejection has its own variant so callers and tests can assert on
//! the exact cause. Each variant belongs to exactly one [`ErrorClass`].
//! A failed call never leaves partial state behind.

use crate::types::{Address, Bytes32, Height};

/// Broad failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Empty, zero or malformed arguments, rejected before any state read.
    Validation,
    /// Caller is not the owner, or a signature does not recover to a live key.
    Authorization,
    /// The call collides with existing state.
    StateConflict,
    /// A Merkle fold, root linkage or historical key check failed.
    ProofVerification,
    /// Snapshot persistence failed.
    Storage,
}

/// Error type covering every operation.
#[derive(Debug, thiserror::Error)]
pub enum AnchorError {
    // ── Validation ──────────────────────────────────────────────────────────
    #[error("Required field is empty or zero: {0}")]
    EmptyField(&'static str),

    #[error("No purposes supplied")]
    EmptyPurposes,

    #[error("Malformed proof: {len} bytes is not a multiple of 32")]
    MalformedProof { len: usize },

    #[error("Proof arrays differ in length: properties {properties}, values {values}, salts {salts}, proofs {proofs}")]
    LengthMismatch {
        properties: usize,
        values: usize,
        salts: usize,
        proofs: usize,
    },

    #[error("Expiration height {expiration} is not after current height {height}")]
    ExpirationNotInFuture { expiration: Height, height: Height },

    #[error("Expiration height {expiration} exceeds the pre-commit window ending at {limit}")]
    ExpirationTooFar { expiration: Height, limit: Height },

    #[error("Input too short: need {needed} bytes at offset {offset}, have {len}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("Value does not fit in 64 bits")]
    ValueOverflow,

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Required proven field missing: {0}")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Authorization ───────────────────────────────────────────────────────
    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Signature does not recover to a valid key")]
    SignatureInvalid,

    #[error("Identifier is not registered: {0}")]
    UnknownIdentifier(String),

    #[error("No identity at address: {0}")]
    IdentityNotFound(String),

    #[error("Document signer {0} is not a signing key of the identity")]
    SignerNotInIdentity(Bytes32),

    #[error("Sender {0} does not act for the anchoring identity")]
    SenderNotIdentity(Address),

    // ── State conflict ──────────────────────────────────────────────────────
    #[error("Anchor already committed: {0}")]
    AlreadyCommitted(Bytes32),

    #[error("Live pre-commit exists for {anchor_id} until height {expiration}")]
    PreCommitActive {
        anchor_id: Bytes32,
        expiration: Height,
    },

    #[error("Identifier already registered: {0}")]
    IdentifierTaken(String),

    #[error("Key not found: {0}")]
    KeyNotFound(Bytes32),

    #[error("Key already revoked: {0}")]
    KeyAlreadyRevoked(Bytes32),

    #[error("Token already minted for anchor {0}")]
    TokenAlreadyMinted(Bytes32),

    #[error("Token id already in use: {0}")]
    TokenIdTaken(Bytes32),

    #[error("Token not found: {0}")]
    TokenNotFound(Bytes32),

    #[error("No anchor committed for {0}")]
    AnchorNotFound(Bytes32),

    // ── Proof verification ──────────────────────────────────────────────────
    #[error("Pre-commit for {anchor_id} expired at height {expiration}")]
    PreCommitExpired {
        anchor_id: Bytes32,
        expiration: Height,
    },

    #[error("Commit identifier differs from the pre-commit identifier")]
    DifferentIdentifier,

    #[error("Signing root is not part of the document root")]
    SigningRootNotInDocument,

    #[error("Claimed document root does not match the anchored root")]
    RootMismatch,

    #[error("Proof for field #{index} does not reach the document root")]
    ProofMismatch { index: usize },

    #[error("Signing key {key} was revoked at height {revoked_at}, anchor committed at {anchored_at}")]
    KeyRevokedAtSigning {
        key: Bytes32,
        revoked_at: Height,
        anchored_at: Height,
    },

    // ── Storage ─────────────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnchorError {
    /// The failure class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        use AnchorError::*;
        match self {
            EmptyField(_)
            | EmptyPurposes
            | MalformedProof { .. }
            | LengthMismatch { .. }
            | ExpirationNotInFuture { .. }
            | ExpirationTooFar { .. }
            | OutOfBounds { .. }
            | ValueOverflow
            | InvalidHex(_)
            | MissingField(_)
            | InvalidInput(_)
            | InvalidConfig(_) => ErrorClass::Validation,

            NotOwner
            | SignatureInvalid
            | UnknownIdentifier(_)
            | IdentityNotFound(_)
            | SignerNotInIdentity(_)
            | SenderNotIdentity(_) => ErrorClass::Authorization,

            AlreadyCommitted(_)
            | PreCommitActive { .. }
            | IdentifierTaken(_)
            | KeyNotFound(_)
            | KeyAlreadyRevoked(_)
            | TokenAlreadyMinted(_)
            | TokenIdTaken(_)
            | TokenNotFound(_)
            | AnchorNotFound(_) => ErrorClass::StateConflict,

            PreCommitExpired { .. }
            | DifferentIdentifier
            | SigningRootNotInDocument
            | RootMismatch
            | ProofMismatch { .. }
            | KeyRevokedAtSigning { .. } => ErrorClass::ProofVerification,

            SerializationError(_) | InvalidFileFormat(_) | Io(_) => ErrorClass::Storage,
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, AnchorError>;
