#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;
use schnorr_zkp_auth::verifier::{
    IdentityStore, MemoryIdentityStore, MemorySessionStore, SessionKey, SessionLocks,
};
use schnorr_zkp_auth::{ChallengeIssuer, DomainParameters, ScriptedRandom, Verifier};

// Arbitrary responses must be answered with a result, never a panic, and
// must consume the pending challenge.
fuzz_target!(|data: &[u8]| {
    let params = DomainParameters::demo();
    let identities = Arc::new(MemoryIdentityStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let locks = Arc::new(SessionLocks::new());
    identities
        .store("neo", BigUint::from(2_026_037u32))
        .unwrap();

    let issuer = ChallengeIssuer::new(
        params.clone(),
        identities.clone(),
        sessions.clone(),
        locks.clone(),
        Arc::new(ScriptedRandom::new([999u32])),
    );
    let verifier = Verifier::new(params, identities, sessions.clone(), locks);

    let session = SessionKey::from("fuzz");
    issuer
        .issue(&session, "neo", &BigUint::from(1_736_435u32))
        .unwrap();

    let response = BigUint::from_bytes_be(data);
    assert!(verifier.verify(&session, &response).is_ok());
    assert!(sessions.is_empty());
});
