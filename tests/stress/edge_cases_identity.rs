//! Edge case tests: identity key registry, factory, and directory.

use proof_anchor::crypto::keys::key_of_address;
use proof_anchor::event::Event;
use proof_anchor::{Address, AnchorError, Bytes32, ErrorClass, Identifier, Ledger, Purpose, Secp256k1KeyPair};

const ALICE: Address = Address([0xa1; 20]);
const BOB: Address = Address([0xb0; 20]);

#[test]
fn edge_factory_addresses_are_distinct() {
    let mut ledger = Ledger::default();
    let a = ledger.create_identity(ALICE).unwrap();
    let b = ledger.create_identity(ALICE).unwrap();
    let c = ledger.create_identity_for(ALICE, BOB).unwrap();
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(ledger.identity(&c).unwrap().owner(), BOB);
    assert!(ledger
        .identity(&c)
        .unwrap()
        .is_key_valid(&key_of_address(&BOB), Purpose::MANAGEMENT));
    assert!(!ledger.created_identity(&Address([0x99; 20])));
    assert!(matches!(
        ledger.create_identity_for(ALICE, Address::ZERO),
        Err(AnchorError::EmptyField("owner"))
    ));
}

#[test]
fn edge_only_owner_manages_keys() {
    let mut ledger = Ledger::default();
    let identity = ledger.create_identity(ALICE).unwrap();
    let key = Secp256k1KeyPair::generate().key();

    let err = ledger.add_key(BOB, identity, key, Purpose::SIGNING).unwrap_err();
    assert!(matches!(err, AnchorError::NotOwner));
    assert_eq!(err.class(), ErrorClass::Authorization);

    ledger.add_key(ALICE, identity, key, Purpose::SIGNING).unwrap();
    assert!(matches!(ledger.revoke_key(BOB, identity, key), Err(AnchorError::NotOwner)));
    assert!(matches!(
        ledger.transfer_ownership(BOB, identity, BOB),
        Err(AnchorError::NotOwner)
    ));
}

#[test]
fn edge_ownership_transfer_moves_control() {
    let mut ledger = Ledger::default();
    let identity = ledger.create_identity(ALICE).unwrap();
    ledger.transfer_ownership(ALICE, identity, BOB).unwrap();

    let key = Bytes32([5; 32]);
    assert!(matches!(
        ledger.add_key(ALICE, identity, key, Purpose::ACTION),
        Err(AnchorError::NotOwner)
    ));
    ledger.add_key(BOB, identity, key, Purpose::ACTION).unwrap();
}

#[test]
fn edge_multi_purpose_emits_only_new_purposes() {
    let mut ledger = Ledger::default();
    let identity = ledger.create_identity(ALICE).unwrap();
    let key = Bytes32([6; 32]);

    ledger.add_key(ALICE, identity, key, Purpose::ACTION).unwrap();
    let written = ledger
        .add_multi_purpose_key(
            ALICE,
            identity,
            key,
            &[Purpose::ACTION, Purpose::SIGNING, Purpose::SIGNING, Purpose(42)],
        )
        .unwrap();
    let purposes: Vec<Purpose> = written
        .iter()
        .map(|r| match &r.event {
            Event::KeyAdded { purpose, .. } => *purpose,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(purposes, vec![Purpose::SIGNING, Purpose(42)]);

    let id = ledger.identity(&identity).unwrap();
    assert_eq!(id.get_key(&key).unwrap().purposes.len(), 3);
    assert!(matches!(
        ledger.add_multi_purpose_key(ALICE, identity, key, &[]),
        Err(AnchorError::EmptyPurposes)
    ));
}

#[test]
fn edge_zero_key_rejected() {
    let mut ledger = Ledger::default();
    let identity = ledger.create_identity(ALICE).unwrap();
    assert!(matches!(
        ledger.add_key(ALICE, identity, Bytes32::ZERO, Purpose::SIGNING),
        Err(AnchorError::EmptyField("key"))
    ));
}

#[test]
fn edge_revocation_is_one_way_and_historical() {
    let mut ledger = Ledger::default();
    let identity = ledger.create_identity(ALICE).unwrap();
    let key = Bytes32([7; 32]);
    ledger.add_key(ALICE, identity, key, Purpose::SIGNING).unwrap();

    ledger.mine(9);
    ledger.revoke_key(ALICE, identity, key).unwrap();
    let revoked_at = ledger.height();
    assert_eq!(revoked_at, 10);

    assert!(matches!(
        ledger.revoke_key(ALICE, identity, key),
        Err(AnchorError::KeyAlreadyRevoked(_))
    ));
    assert!(matches!(
        ledger.add_key(ALICE, identity, key, Purpose::ACTION),
        Err(AnchorError::KeyAlreadyRevoked(_))
    ));
    assert!(matches!(
        ledger.revoke_key(ALICE, identity, Bytes32([8; 32])),
        Err(AnchorError::KeyNotFound(_))
    ));

    let id = ledger.identity(&identity).unwrap();
    assert!(!id.is_key_valid(&key, Purpose::SIGNING));
    assert!(id.is_key_valid_at(&key, Purpose::SIGNING, revoked_at - 1));
    assert!(!id.is_key_valid_at(&key, Purpose::SIGNING, revoked_at));
    // revoked keys stay listed
    assert_eq!(id.get_keys_by_purpose(Purpose::SIGNING), vec![key]);
    assert_eq!(id.get_key(&key).unwrap().revoked_at, revoked_at);
}

#[test]
fn edge_directory_slots() {
    let mut ledger = Ledger::default();
    let first = ledger.create_identity(ALICE).unwrap();
    let second = ledger.create_identity(ALICE).unwrap();
    let name = Identifier::from("acme");

    ledger.register_identity(ALICE, name.clone(), first).unwrap();
    assert!(matches!(
        ledger.register_identity(BOB, name.clone(), second),
        Err(AnchorError::IdentifierTaken(_))
    ));
    assert!(matches!(
        ledger.update_identity(BOB, &name, second),
        Err(AnchorError::NotOwner)
    ));
    assert!(matches!(
        ledger.update_identity(ALICE, &Identifier::from("globex"), second),
        Err(AnchorError::UnknownIdentifier(_))
    ));
    assert!(matches!(
        ledger.register_identity(ALICE, Identifier::new(Vec::new()), first),
        Err(AnchorError::EmptyField("identifier"))
    ));

    ledger.update_identity(ALICE, &name, second).unwrap();
    assert_eq!(ledger.resolve(&name).unwrap().address(), second);
    assert_eq!(ledger.directory().lookup(&name).unwrap().owner, ALICE);
}

#[test]
fn edge_directory_pointing_at_missing_identity() {
    let mut ledger = Ledger::default();
    let name = Identifier::from("ghost");
    ledger
        .register_identity(ALICE, name.clone(), Address([0x66; 20]))
        .unwrap();
    assert!(matches!(ledger.resolve(&name), Err(AnchorError::IdentityNotFound(_))));
}
