mod common;

use std::sync::Arc;
use std::thread;

use common::Harness;
use num_bigint::BigUint;
use schnorr_zkp_auth::verifier::{IdentityStore, SessionKey};
use schnorr_zkp_auth::{DomainParameters, Error, KeyPair, Prover, ScriptedRandom, SecureRng};

#[test]
fn challenge_can_be_answered_once() {
    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32])));
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let session = SessionKey::from("replay");
    let (commitment, nonce) = prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
    let response = prover
        .respond(&challenge, nonce, keys.private_exponent())
        .unwrap();

    assert!(h.verifier.verify(&session, &response).unwrap().accepted);

    let replay = h.verifier.verify(&session, &response);
    assert_eq!(replay, Err(Error::SessionExpired));
}

#[test]
fn replayed_transcript_fails_against_fresh_challenge() {
    let h = Harness::demo(Arc::new(ScriptedRandom::new([999u32, 1_001u32])));
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let honest = SessionKey::from("honest");
    let (commitment, nonce) = prover.commit(&ScriptedRandom::new([777u32])).unwrap();
    let challenge = h.issuer.issue(&honest, "neo", &commitment).unwrap();
    let response = prover
        .respond(&challenge, nonce, keys.private_exponent())
        .unwrap();
    assert!(h.verifier.verify(&honest, &response).unwrap().accepted);

    // An eavesdropper re-sends the observed commitment and response.
    let attacker = SessionKey::from("attacker");
    h.issuer.issue(&attacker, "neo", &commitment).unwrap();
    let result = h.verifier.verify(&attacker, &response).unwrap();
    assert!(!result.accepted);
}

#[test]
fn wrong_exponent_is_rejected_across_challenges() {
    let params = DomainParameters::rfc3526_2048();
    let h = Harness::new(params.clone(), Arc::new(SecureRng::new()));

    let keys = KeyPair::derive(b"password123", &params).unwrap();
    let impostor = KeyPair::derive(b"password1234", &params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(params);
    let rng = SecureRng::new();

    let accepted = (0..16)
        .filter(|round| {
            let session = SessionKey::new(format!("guess-{round}"));
            let (commitment, nonce) = prover.commit(&rng).unwrap();
            let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
            let response = prover
                .respond(&challenge, nonce, impostor.private_exponent())
                .unwrap();
            h.verifier.verify(&session, &response).unwrap().accepted
        })
        .count();

    assert_eq!(accepted, 0);
}

#[test]
fn wrong_exponent_acceptance_is_negligible_over_many_challenges() {
    const TRIALS: usize = 5_000;

    let h = Harness::demo(Arc::new(SecureRng::new()));
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &h.params).unwrap();
    let impostor = KeyPair::from_exponent(BigUint::from(12_346u32), &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let rng = SecureRng::new();
    let session = SessionKey::from("guessing");

    let accepted = (0..TRIALS)
        .filter(|_| {
            let (commitment, nonce) = prover.commit(&rng).unwrap();
            let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
            let response = prover
                .respond(&challenge, nonce, impostor.private_exponent())
                .unwrap();
            h.verifier.verify(&session, &response).unwrap().accepted
        })
        .count();

    // 2 generates all of Z_p^*, so an exponent off by one passes only for a
    // challenge that is a multiple of p-1, which is never drawn.
    assert_eq!(accepted, 0, "{accepted} of {TRIALS} forged responses accepted");
    assert!(h.sessions.is_empty());
}

#[test]
fn concurrent_sessions_are_independent() {
    let h = Arc::new(Harness::demo(Arc::new(SecureRng::new())));
    let keys = KeyPair::derive(b"password123", &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let h = Arc::clone(&h);
            let keys = keys.clone();
            thread::spawn(move || {
                let prover = Prover::new(h.params.clone());
                let rng = SecureRng::new();

                for round in 0..16 {
                    let session = SessionKey::new(format!("worker-{worker}-{round}"));
                    let (commitment, nonce) = prover.commit(&rng).unwrap();
                    let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
                    let response = prover
                        .respond(&challenge, nonce, keys.private_exponent())
                        .unwrap();
                    assert!(h.verifier.verify(&session, &response).unwrap().accepted);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(h.sessions.is_empty());
}

#[test]
fn racing_verifications_consume_challenge_once() {
    let h = Arc::new(Harness::demo(Arc::new(SecureRng::new())));
    let keys = KeyPair::derive(b"password123", &h.params).unwrap();
    h.identities.store("neo", keys.public_key().clone()).unwrap();

    let prover = Prover::new(h.params.clone());
    let session = SessionKey::from("contested");
    let (commitment, nonce) = prover.commit(&SecureRng::new()).unwrap();
    let challenge = h.issuer.issue(&session, "neo", &commitment).unwrap();
    let response = prover
        .respond(&challenge, nonce, keys.private_exponent())
        .unwrap();

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| h.verifier.verify(&session, &response)))
            .collect();
        handles.into_iter().map(|t| t.join().unwrap()).collect()
    });

    let accepted = outcomes
        .iter()
        .filter(|r| matches!(r, Ok(result) if result.accepted))
        .count();
    let expired = outcomes
        .iter()
        .filter(|r| matches!(r, Err(Error::SessionExpired)))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(expired, outcomes.len() - 1);
}

#[test]
fn private_exponent_is_not_printed() {
    let params = DomainParameters::demo();
    let keys = KeyPair::from_exponent(BigUint::from(12_345u32), &params).unwrap();

    let debug = format!("{keys:?}");
    assert!(!debug.contains("12345"));
}
