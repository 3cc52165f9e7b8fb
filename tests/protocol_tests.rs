mod common;

use std::sync::Arc;

use common::{init_tracing, Harness};
use num_bigint::BigUint;
use schnorr_zkp_auth::verifier::{IdentityStore, SessionKey};
use schnorr_zkp_auth::{Error, KeyPair, Prover, ScriptedRandom, SecureRng};

#[test]
fn concrete_scenario_is_accepted() {
    init_tracing();

    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32])));
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &h.params).unwrap();
    assert_eq!(
        keys.public_key(),
        &BigUint::from(2u32).modpow(&BigUint::from(12_345u32), h.params.modulus())
    );
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let (commitment, nonce) = prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    assert_eq!(commitment, BigUint::from(1_736_435u32));

    let session = SessionKey::from("concrete");
    let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
    assert_eq!(challenge, BigUint::from(999u32));

    let response = prover
        .respond(&challenge, nonce, keys.private_exponent())
        .unwrap();
    assert_eq!(response, BigUint::from(1_552_880u32));

    let result = h.verifier.verify(&session, &response).unwrap();
    let p = h.params.modulus();
    assert_eq!(result.lhs, BigUint::from(2u32).modpow(&response, p));
    assert_eq!(
        result.rhs,
        (&commitment * keys.public_key().modpow(&challenge, p)) % p
    );
    assert_eq!(result.lhs, result.rhs);
    assert!(result.accepted);
    assert_eq!(result.subject_identity, "neo");
}

#[test]
fn response_off_by_one_is_rejected() {
    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32])));
    h.identities
        .store("neo", BigUint::from(2_026_037u32))
        .unwrap();

    let session = SessionKey::from("negative");
    h.issuer
        .issue(&session, "neo", &BigUint::from(1_736_435u32))
        .unwrap();

    let result = h
        .verifier
        .verify(&session, &BigUint::from(1_552_881u32))
        .unwrap();

    assert!(!result.accepted);
    assert_ne!(result.lhs, result.rhs);
}

#[test]
fn honest_prover_is_accepted_with_password_key() {
    let h = Harness::demo(Arc::new(SecureRng::new()));
    let keys = KeyPair::derive(b"correct horse battery staple", &h.params).unwrap();
    h.identities.store("trinity", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let rng = SecureRng::new();

    for round in 0..10 {
        let session = SessionKey::new(format!("round-{round}"));
        let (commitment, nonce) = prover.commit(&rng).unwrap();
        let challenge = h.issuer.issue(&session, "trinity", &commitment).unwrap();
        let response = prover
            .respond(&challenge, nonce, keys.private_exponent())
            .unwrap();

        assert!(h.verifier.verify(&session, &response).unwrap().accepted);
    }

    assert!(h.sessions.is_empty());
}

#[test]
fn wrong_password_is_rejected() {
    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32])));
    let registered = KeyPair::derive(b"password123", &h.params).unwrap();
    let guessed = KeyPair::derive(b"password124", &h.params).unwrap();
    h.identities.store("neo", registered.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let session = SessionKey::from("guess");
    let (commitment, nonce) = prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
    let response = prover
        .respond(&challenge, nonce, guessed.private_exponent())
        .unwrap();

    assert!(!h.verifier.verify(&session, &response).unwrap().accepted);
}

#[test]
fn new_claim_replaces_pending_challenge() {
    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32, 1_000u32])));
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let session = SessionKey::from("replaced");

    let (first_commitment, first_nonce) =
        prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    let first_challenge = h.issuer.issue(&session, "neo", &first_commitment).unwrap();

    let (second_commitment, _second_nonce) =
        prover.commit(&ScriptedRandom::new([778u32])).unwrap();
    h.issuer.issue(&session, "neo", &second_commitment).unwrap();
    assert_eq!(h.sessions.len(), 1);

    let stale = prover
        .respond(&first_challenge, first_nonce, keys.private_exponent())
        .unwrap();
    let result = h.verifier.verify(&session, &stale).unwrap();
    assert!(!result.accepted);
    assert!(h.sessions.is_empty());
}

#[test]
fn only_latest_claim_is_honored() {
    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32, 1_000u32])));
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let session = SessionKey::from("replaced");

    let (first_commitment, _first_nonce) =
        prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    h.issuer.issue(&session, "neo", &first_commitment).unwrap();

    let (second_commitment, second_nonce) =
        prover.commit(&ScriptedRandom::new([778u32])).unwrap();
    let second_challenge = h.issuer.issue(&session, "neo", &second_commitment).unwrap();
    assert_eq!(second_challenge, BigUint::from(1_000u32));

    let response = prover
        .respond(&second_challenge, second_nonce, keys.private_exponent())
        .unwrap();
    let result = h.verifier.verify(&session, &response).unwrap();

    let p = h.params.modulus();
    assert!(result.accepted);
    assert_eq!(
        result.rhs,
        (&second_commitment * keys.public_key().modpow(&second_challenge, p)) % p
    );
    assert!(h.sessions.is_empty());
}

#[test]
fn commitment_outside_group_is_rejected() {
    let h = Harness::demo(Arc::new(SecureRng::new()));
    h.identities
        .store("neo", BigUint::from(2_026_037u32))
        .unwrap();
    let session = SessionKey::from("range");

    let zero = h.issuer.issue(&session, "neo", &BigUint::from(0u32));
    assert!(matches!(zero, Err(Error::InvalidCommitment(_))));

    let modulus = h.params.modulus().clone();
    let at_modulus = h.issuer.issue(&session, "neo", &modulus);
    assert!(matches!(at_modulus, Err(Error::InvalidCommitment(_))));

    assert!(h.sessions.is_empty());

    let edge = h.issuer.issue(&session, "neo", &(modulus - 1u32));
    assert!(edge.is_ok());
}

#[test]
fn unknown_identity_stores_nothing() {
    let h = Harness::demo(Arc::new(SecureRng::new()));
    let session = SessionKey::from("nobody");

    let result = h.issuer.issue(&session, "morpheus", &BigUint::from(5u32));
    assert_eq!(result, Err(Error::IdentityNotFound("morpheus".to_string())));
    assert!(h.sessions.is_empty());

    let verify = h.verifier.verify(&session, &BigUint::from(1u32));
    assert_eq!(verify, Err(Error::SessionExpired));
}

#[test]
fn prover_rejects_out_of_range_challenge() {
    let params = schnorr_zkp_auth::DomainParameters::demo();
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &params).unwrap();
    let prover = Prover::new(params.clone());

    let (_, nonce) = prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    let zero = prover.respond(&BigUint::from(0u32), nonce, keys.private_exponent());
    assert!(matches!(zero, Err(Error::InvalidChallenge(_))));

    let (_, nonce) = prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    let top = prover.respond(&params.exponent_modulus(), nonce, keys.private_exponent());
    assert!(matches!(top, Err(Error::InvalidChallenge(_))));
}
