//! Fuzz target for memo and consensus payload decoding.
//!
//! ## Running
//!
//! ```bash
//! cd crates/secondary-keys
//! cargo +nightly fuzz run fuzz_envelope_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use secondary_keys::{
    decode_memo, InjectedAggregateTx, SecondarySignature, VoteExtensionPayload,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = SecondarySignature::decode(data) {
        // Decoded signatures are never left with a recovery byte
        assert_ne!(envelope.signature.len(), 65);
        if envelope.validate().is_ok() {
            let again = SecondarySignature::decode(&envelope.encode().unwrap()).unwrap();
            assert_eq!(again, envelope);
        }
    }

    if let Ok(memo) = std::str::from_utf8(data) {
        let _ = decode_memo(memo, "SECONDARY");
    }

    if let Ok(payload) = VoteExtensionPayload::decode(data) {
        assert!(!payload.signature.is_empty());
    }

    let _ = InjectedAggregateTx::decode(data);
});
