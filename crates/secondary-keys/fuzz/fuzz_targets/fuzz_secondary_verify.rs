//! Fuzz target for secondary signature verification and key recovery.
//!
//! ## Running
//!
//! ```bash
//! cd crates/secondary-keys
//! cargo +nightly fuzz run fuzz_secondary_verify
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use secondary_keys::{recover, verify};

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    message_hash: [u8; 32],
    public_key: Vec<u8>,
    r: [u8; 32],
    s: [u8; 32],
    v: u8,
}

fuzz_target!(|input: FuzzInput| {
    let mut signature = Vec::with_capacity(65);
    signature.extend_from_slice(&input.r);
    signature.extend_from_slice(&input.s);

    // Must never panic, and must be deterministic
    let first = verify(&input.public_key, &input.message_hash, &signature);
    let second = verify(&input.public_key, &input.message_hash, &signature);
    assert_eq!(first, second);

    signature.push(input.v);
    if let Ok(recovered) = recover(&input.message_hash, &signature) {
        // A recovered key always verifies its own signature
        assert_eq!(recovered.len(), 65);
        assert!(verify(&recovered, &input.message_hash, &signature[..64]));
    }
});
