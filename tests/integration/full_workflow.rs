//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Provision an identity and its keys
//! 2. Register an identifier for it
//! 3. Build and sign a provable document
//! 4. Pre-commit and commit the document's anchor
//! 5. Mint a token against the anchored root
//! 6. Supersede the document with a later anchor

use proof_anchor::anchor::{commit_digest, pre_commit_digest};
use proof_anchor::crypto::keys::key_of_address;
use proof_anchor::event::Event;
use proof_anchor::mint::DocumentBuilder;
use proof_anchor::{
    sign_consensus, sign_personal, Address, Bytes32, Identifier, Ledger, LedgerConfig, MintRequest, Purpose,
    Secp256k1KeyPair,
};

const ALICE: Address = Address([0xa1; 20]);
const RELAYER: Address = Address([0x77; 20]);
const HOLDER: Address = Address([0x42; 20]);

#[test]
fn full_workflow_identity_to_token() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = LedgerConfig::default();
    config.mint.token_uri_base = "https://tokens.example/".into();
    let mut ledger = Ledger::new(config);

    // ── Step 1: Provision an identity ───────────────────────────────────
    let identity = ledger.create_identity(ALICE).expect("factory should provision");
    assert!(ledger.created_identity(&identity));
    assert!(ledger
        .identity(&identity)
        .unwrap()
        .is_key_valid(&key_of_address(&ALICE), Purpose::MANAGEMENT));

    let auth = Secp256k1KeyPair::generate();
    let signing = Secp256k1KeyPair::generate();
    ledger
        .add_key(ALICE, identity, auth.key(), Purpose::AUTHENTICATION)
        .unwrap();
    ledger
        .add_multi_purpose_key(ALICE, identity, signing.key(), &[Purpose::SIGNING, Purpose::ACTION])
        .unwrap();

    let record = ledger.identity(&identity).unwrap().get_key(&signing.key()).unwrap().clone();
    assert!(record.has_purpose(Purpose::SIGNING));
    assert!(record.has_purpose(Purpose::ACTION));
    assert_eq!(record.revoked_at, 0);

    // ── Step 2: Register an identifier ──────────────────────────────────
    let issuer = Identifier::from("acme-invoices");
    ledger.register_identity(ALICE, issuer.clone(), identity).unwrap();
    assert_eq!(ledger.directory().identity_of(&issuer), Some(identity));

    // ── Step 3: Build and sign a document ───────────────────────────────
    let unsigned = DocumentBuilder::new()
        .salted_field("invoice.number", "INV-2041")
        .salted_field("invoice.amount", "125000")
        .salted_field("invoice.currency", "EUR")
        .salted_field("invoice.debtor", "Globex")
        .build()
        .unwrap();
    let signature = sign_consensus(signing.signing_key(), &unsigned.signing_root()).unwrap();
    let document = unsigned
        .with_signature(&ledger.config().mint, &signature)
        .unwrap();
    let document_root = document.document_root();

    // ── Step 4: Anchor it ───────────────────────────────────────────────
    let anchor_id = Bytes32::from_u64(2041);
    let expiration = ledger.height() + 10;
    let pre_sig = sign_personal(
        auth.signing_key(),
        &pre_commit_digest(&anchor_id, &document.signing_root(), &issuer, expiration),
    )
    .unwrap();
    ledger
        .pre_commit(RELAYER, anchor_id, document.signing_root(), issuer.clone(), &pre_sig, expiration)
        .expect("pre-commit should be accepted");
    assert!(ledger.has_valid_pre_commit(&anchor_id));

    ledger.mine(3);
    let commit_sig = sign_personal(auth.signing_key(), &commit_digest(&anchor_id, &document_root, &issuer)).unwrap();
    ledger
        .commit(
            RELAYER,
            anchor_id,
            document_root,
            issuer.clone(),
            &document.signing_root_proof(),
            &commit_sig,
        )
        .expect("commit should be accepted");

    let anchor = ledger.get_anchor_by_id(&anchor_id);
    assert_eq!(anchor.document_root, document_root);
    assert_eq!(anchor.identifier, issuer);
    assert_eq!(anchor.committed_at, ledger.height());
    assert!(!ledger.has_valid_pre_commit(&anchor_id));

    // ── Step 5: Mint a token ────────────────────────────────────────────
    let token_id = Bytes32::from_u64(1);
    let fields = document
        .field_proofs(&[
            b"invoice.amount",
            b"invoice.currency",
            proof_anchor::config::DEFAULT_SIGNING_ROOT_PROPERTY,
            proof_anchor::config::DEFAULT_SIGNATURE_PROPERTY,
        ])
        .unwrap();
    let request = MintRequest::new(HOLDER, token_id, anchor_id, document_root).with_fields(fields);
    ledger.mine(1);
    ledger
        .mint_with_identity(ALICE, request.clone())
        .expect("signed document should mint");

    // one token per anchored document
    let mut retry = request;
    retry.token_id = Bytes32::from_u64(2);
    assert!(ledger.mint_with_identity(ALICE, retry).is_err());

    let token = ledger.tokens().token(&token_id).unwrap();
    assert_eq!(token.owner, HOLDER);
    assert_eq!(token.field(b"invoice.amount"), Some(b"125000".as_slice()));
    assert!(token.uri.starts_with("https://tokens.example/"));
    assert_eq!(ledger.tokens().token_by_anchor(&anchor_id).unwrap().token_id, token_id);

    // ── Step 6: Supersede the document ──────────────────────────────────
    let next_anchor = Bytes32::from_u64(2042);
    assert!(ledger.is_token_latest_document(&token_id, &next_anchor).unwrap());

    ledger.mine(5);
    let amended = Bytes32([0xee; 32]);
    let sig = sign_personal(auth.signing_key(), &commit_digest(&next_anchor, &amended, &issuer)).unwrap();
    ledger.commit(RELAYER, next_anchor, amended, issuer.clone(), &[], &sig).unwrap();
    assert!(!ledger.is_token_latest_document(&token_id, &next_anchor).unwrap());

    // ── Event log ───────────────────────────────────────────────────────
    let tags: Vec<&str> = ledger.events().records().iter().map(|r| r.event.as_tag()).collect();
    assert_eq!(tags.first(), Some(&"identity_created"));
    assert_eq!(tags.last(), Some(&"anchor_committed"));
    assert_eq!(ledger.events().by_tag("token_minted").len(), 1);
    let anchor_events = ledger.events().for_anchor(&anchor_id);
    assert!(matches!(anchor_events[0].event, Event::AnchorPreCommitted { .. }));
    assert!(matches!(anchor_events[1].event, Event::AnchorCommitted { .. }));
    assert!(matches!(anchor_events[2].event, Event::TokenMinted { .. }));
}
