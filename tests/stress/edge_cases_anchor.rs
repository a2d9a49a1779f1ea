//! Edge case tests: two-phase anchoring.
//!
//! Covers replay of pre-commit signatures, slot exclusivity, expiry at
//! the exact boundary height, identifier binding, and key revocation.

use proof_anchor::anchor::{commit_digest, pre_commit_digest};
use proof_anchor::crypto::merkle::MerkleTree;
use proof_anchor::crypto::hash::sha256;
use proof_anchor::{
    sign_personal, Address, AnchorError, Bytes32, ErrorClass, Height, Identifier, Ledger, Purpose, Secp256k1KeyPair,
};

const OWNER_A: Address = Address([0x0a; 20]);
const OWNER_B: Address = Address([0x0b; 20]);
const RELAYER: Address = Address([0x77; 20]);

struct Issuer {
    identity: Address,
    identifier: Identifier,
    key: Secp256k1KeyPair,
}

fn issuer(ledger: &mut Ledger, owner: Address, name: &str) -> Issuer {
    let key = Secp256k1KeyPair::generate();
    let identity = ledger.create_identity(owner).unwrap();
    ledger
        .add_key(owner, identity, key.key(), Purpose::AUTHENTICATION)
        .unwrap();
    let identifier = Identifier::from(name);
    ledger.register_identity(owner, identifier.clone(), identity).unwrap();
    Issuer {
        identity,
        identifier,
        key,
    }
}

fn pre_commit_sig(issuer: &Issuer, anchor: &Bytes32, signing_root: &Bytes32, exp: Height) -> [u8; 65] {
    sign_personal(
        issuer.key.signing_key(),
        &pre_commit_digest(anchor, signing_root, &issuer.identifier, exp),
    )
    .unwrap()
}

fn commit_sig(issuer: &Issuer, anchor: &Bytes32, root: &Bytes32) -> [u8; 65] {
    sign_personal(issuer.key.signing_key(), &commit_digest(anchor, root, &issuer.identifier)).unwrap()
}

/// A four-leaf document whose third leaf is the signing root.
fn document() -> (Bytes32, Bytes32, Vec<Bytes32>) {
    let leaves: Vec<Bytes32> = (0u8..4).map(|i| sha256(&[0xd0, i])).collect();
    let tree = MerkleTree::from_leaves(leaves.clone());
    (tree.root(), leaves[2], tree.proof(2).unwrap())
}

#[test]
fn edge_expired_pre_commit_cannot_be_committed() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let anchor = Bytes32::from_u64(0xfeed);
    let (root, signing_root, proof) = document();

    let h = ledger.height();
    let sig = pre_commit_sig(&a, &anchor, &signing_root, h + 15);
    ledger
        .pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, h + 15)
        .unwrap();

    ledger.mine(15);
    assert_eq!(ledger.height(), h + 15);
    assert!(!ledger.has_valid_pre_commit(&anchor));

    let err = ledger
        .commit(RELAYER, anchor, root, a.identifier.clone(), &proof, &commit_sig(&a, &anchor, &root))
        .unwrap_err();
    assert!(matches!(err, AnchorError::PreCommitExpired { .. }));
    assert_eq!(err.class(), ErrorClass::ProofVerification);
    assert!(ledger.anchors().find_pre_anchor(&anchor).is_some());
    assert!(!ledger.anchors().has_anchor(&anchor));

    // a fresh reservation at the later height goes through
    let later = ledger.height();
    let sig = pre_commit_sig(&a, &anchor, &signing_root, later + 15);
    ledger
        .pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, later + 15)
        .unwrap();
    ledger
        .commit(RELAYER, anchor, root, a.identifier.clone(), &proof, &commit_sig(&a, &anchor, &root))
        .unwrap();
}

#[test]
fn edge_commit_one_height_before_expiry() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let anchor = Bytes32::from_u64(1);
    let (root, signing_root, proof) = document();

    let h = ledger.height();
    let sig = pre_commit_sig(&a, &anchor, &signing_root, h + 15);
    ledger
        .pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, h + 15)
        .unwrap();
    ledger.mine(14);
    ledger
        .commit(RELAYER, anchor, root, a.identifier.clone(), &proof, &commit_sig(&a, &anchor, &root))
        .unwrap();
    assert_eq!(ledger.get_anchor_by_id(&anchor).committed_at, h + 14);
}

#[test]
fn edge_pre_commit_signature_bound_to_expiration() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let anchor = Bytes32::from_u64(2);
    let signing_root = Bytes32([0x51; 32]);
    let h = ledger.height();

    // signed for h + 10, replayed with a longer reservation
    let sig = pre_commit_sig(&a, &anchor, &signing_root, h + 10);
    assert!(matches!(
        ledger.pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, h + 100),
        Err(AnchorError::SignatureInvalid)
    ));
    ledger
        .pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, h + 10)
        .unwrap();

    // once the reservation lapses the same signature is stale
    ledger.mine(10);
    assert!(matches!(
        ledger.pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, h + 10),
        Err(AnchorError::ExpirationNotInFuture { .. })
    ));
}

#[test]
fn edge_live_pre_commit_excludes_other_issuers() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let b = issuer(&mut ledger, OWNER_B, "issuer-b");
    let anchor = Bytes32::from_u64(3);
    let h = ledger.height();

    let root_a = Bytes32([0xaa; 32]);
    let sig = pre_commit_sig(&a, &anchor, &root_a, h + 5);
    ledger
        .pre_commit(RELAYER, anchor, root_a, a.identifier.clone(), &sig, h + 5)
        .unwrap();

    let root_b = Bytes32([0xbb; 32]);
    let sig_b = pre_commit_sig(&b, &anchor, &root_b, h + 8);
    let err = ledger
        .pre_commit(RELAYER, anchor, root_b, b.identifier.clone(), &sig_b, h + 8)
        .unwrap_err();
    assert!(matches!(err, AnchorError::PreCommitActive { .. }));
    assert_eq!(err.class(), ErrorClass::StateConflict);

    // after expiry the slot is free again
    ledger.mine(5);
    let sig_b = pre_commit_sig(&b, &anchor, &root_b, h + 12);
    ledger
        .pre_commit(RELAYER, anchor, root_b, b.identifier.clone(), &sig_b, h + 12)
        .unwrap();
    assert_eq!(ledger.get_pre_anchor_by_id(&anchor).identifier, b.identifier);
}

#[test]
fn edge_commit_bound_to_pre_commit_identifier() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let b = issuer(&mut ledger, OWNER_B, "issuer-b");
    let anchor = Bytes32::from_u64(4);
    let (root, signing_root, proof) = document();
    let h = ledger.height();

    let sig = pre_commit_sig(&a, &anchor, &signing_root, h + 20);
    ledger
        .pre_commit(RELAYER, anchor, signing_root, a.identifier.clone(), &sig, h + 20)
        .unwrap();

    assert!(matches!(
        ledger.commit(RELAYER, anchor, root, b.identifier.clone(), &proof, &commit_sig(&b, &anchor, &root)),
        Err(AnchorError::DifferentIdentifier)
    ));
    ledger
        .commit(RELAYER, anchor, root, a.identifier.clone(), &proof, &commit_sig(&a, &anchor, &root))
        .unwrap();
}

#[test]
fn edge_commit_signature_must_match_root() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let anchor = Bytes32::from_u64(5);
    let signed_root = Bytes32([0x01; 32]);
    let other_root = Bytes32([0x02; 32]);

    let err = ledger
        .commit(
            RELAYER,
            anchor,
            other_root,
            a.identifier.clone(),
            &[],
            &commit_sig(&a, &anchor, &signed_root),
        )
        .unwrap_err();
    assert!(matches!(err, AnchorError::SignatureInvalid));
    assert_eq!(err.class(), ErrorClass::Authorization);
    assert!(ledger.events().for_anchor(&anchor).is_empty());
}

#[test]
fn edge_revoked_authentication_key_cannot_anchor() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    ledger.revoke_key(OWNER_A, a.identity, a.key.key()).unwrap();

    let anchor = Bytes32::from_u64(6);
    let root = Bytes32([0x06; 32]);
    assert!(matches!(
        ledger.commit(RELAYER, anchor, root, a.identifier.clone(), &[], &commit_sig(&a, &anchor, &root)),
        Err(AnchorError::SignatureInvalid)
    ));
}

#[test]
fn edge_truncated_signature_rejected() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let anchor = Bytes32::from_u64(7);
    let root = Bytes32([0x07; 32]);
    let sig = commit_sig(&a, &anchor, &root);
    assert!(matches!(
        ledger.commit(RELAYER, anchor, root, a.identifier.clone(), &[], &sig[..64]),
        Err(AnchorError::SignatureInvalid)
    ));
}

#[test]
fn edge_repointed_identifier_uses_new_identity_keys() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");

    let rotated = Secp256k1KeyPair::generate();
    let replacement = ledger.create_identity(OWNER_A).unwrap();
    ledger
        .add_key(OWNER_A, replacement, rotated.key(), Purpose::AUTHENTICATION)
        .unwrap();
    ledger.update_identity(OWNER_A, &a.identifier, replacement).unwrap();

    let anchor = Bytes32::from_u64(8);
    let root = Bytes32([0x08; 32]);
    assert!(matches!(
        ledger.commit(RELAYER, anchor, root, a.identifier.clone(), &[], &commit_sig(&a, &anchor, &root)),
        Err(AnchorError::SignatureInvalid)
    ));
    let sig = sign_personal(rotated.signing_key(), &commit_digest(&anchor, &root, &a.identifier)).unwrap();
    ledger
        .commit(RELAYER, anchor, root, a.identifier.clone(), &[], &sig)
        .unwrap();
}

#[test]
fn edge_recommit_fails_whatever_the_signature() {
    let mut ledger = Ledger::default();
    let a = issuer(&mut ledger, OWNER_A, "issuer-a");
    let anchor = Bytes32::from_u64(9);
    let root = Bytes32([0x09; 32]);
    ledger
        .commit(RELAYER, anchor, root, a.identifier.clone(), &[], &commit_sig(&a, &anchor, &root))
        .unwrap();
    let before = ledger.events().len();

    let other_root = Bytes32([0x10; 32]);
    let garbage = [0xabu8; 65];
    let err = ledger
        .commit(RELAYER, anchor, other_root, a.identifier.clone(), &[], &garbage)
        .unwrap_err();
    assert!(matches!(err, AnchorError::AlreadyCommitted(id) if id == anchor));
    assert_eq!(err.class(), ErrorClass::StateConflict);

    let foreign = Secp256k1KeyPair::generate();
    let foreign_sig =
        sign_personal(foreign.signing_key(), &commit_digest(&anchor, &other_root, &a.identifier)).unwrap();
    assert!(matches!(
        ledger.commit(RELAYER, anchor, other_root, a.identifier.clone(), &[], &foreign_sig),
        Err(AnchorError::AlreadyCommitted(_))
    ));

    assert_eq!(ledger.get_anchor_by_id(&anchor).document_root, root);
    assert_eq!(ledger.events().len(), before);
}
