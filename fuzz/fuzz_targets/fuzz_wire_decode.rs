#![no_main]

use libfuzzer_sys::fuzz_target;
use schnorr_zkp_auth::wire;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(value) = wire::decode("fuzz", text) {
            assert_eq!(wire::decode("fuzz", &wire::encode(&value)), Ok(value));
        }
    }
});
