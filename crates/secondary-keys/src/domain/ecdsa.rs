//! # Secondary Signature Verifier (secp256k1 + Keccak-256)
//!
//! Pure hash-and-verify and public-key recovery for the secondary factor.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be STRICTLY LESS THAN the half order,
//!   for verification and for recovery alike
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: range checks use the `subtle` crate
//! - **Determinism**: every function is a pure function of its inputs; malformed
//!   input yields `false` or an error, never a panic

use super::errors::{Result, SecondaryKeyError};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::Hash;
use std::fmt;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Length of a signature without its recovery byte (r || s).
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of a recoverable signature (r || s || v).
pub const RECOVERABLE_SIGNATURE_LENGTH: usize = 65;

/// Length of an uncompressed SEC1 public key (0x04 || x || y).
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// n/2, the malleability boundary.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

// =============================================================================
// HASHING
// =============================================================================

/// Keccak-256, the fixed hash of the secondary scheme.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Message hash signed on the account path (registration and memo
/// authentication): `keccak256(public_key)` over the declared key bytes.
pub fn account_message_hash(public_key: &[u8]) -> Hash {
    keccak256(public_key)
}

// =============================================================================
// VERIFY / RECOVER
// =============================================================================

/// Verify a 64-byte `r || s` signature over `message_hash` for `public_key`.
///
/// `public_key` is SEC1 encoded (65-byte uncompressed or 33-byte compressed).
/// Returns `false` for any malformed input.
pub fn verify(public_key: &[u8], message_hash: &Hash, signature: &[u8]) -> bool {
    let Some((r, s)) = split_rs(signature) else {
        return false;
    };

    if !is_valid_scalar(&r) || !is_valid_scalar(&s) || !is_low_s(&s) {
        return false;
    }

    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(signature) else {
        return false;
    };

    verifying_key.verify_prehash(message_hash, &sig).is_ok()
}

/// Recover the signer's uncompressed public key from a 65-byte signature.
///
/// The recovery byte may be 0, 1, 27 or 28.
pub fn recover(message_hash: &Hash, signature: &[u8]) -> Result<Vec<u8>> {
    if signature.len() != RECOVERABLE_SIGNATURE_LENGTH {
        return Err(SecondaryKeyError::RecoveryError(format!(
            "expected {} bytes, got {}",
            RECOVERABLE_SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let recovery_id = parse_recovery_id(signature[SIGNATURE_LENGTH])?;

    let Some((r, s)) = split_rs(&signature[..SIGNATURE_LENGTH]) else {
        return Err(SecondaryKeyError::RecoveryError("bad r/s".into()));
    };
    if !is_valid_scalar(&r) || !is_valid_scalar(&s) {
        return Err(SecondaryKeyError::RecoveryError(
            "scalar out of range".into(),
        ));
    }
    if !is_low_s(&s) {
        return Err(SecondaryKeyError::RecoveryError(
            "malleable signature (high S)".into(),
        ));
    }

    let sig = Signature::from_slice(&signature[..SIGNATURE_LENGTH])
        .map_err(|e| SecondaryKeyError::RecoveryError(e.to_string()))?;

    let recovered = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|e| SecondaryKeyError::RecoveryError(e.to_string()))?;

    Ok(recovered.to_encoded_point(false).as_bytes().to_vec())
}

/// Drop a trailing recovery byte, leaving `r || s`.
pub fn strip_recovery_byte(signature: &[u8]) -> &[u8] {
    if signature.len() == RECOVERABLE_SIGNATURE_LENGTH {
        &signature[..SIGNATURE_LENGTH]
    } else {
        signature
    }
}

// =============================================================================
// SIGNING KEY
// =============================================================================

/// A secondary secp256k1 private key.
///
/// Used by validators to sign vote extensions and by clients to produce
/// account envelopes. `Debug` never prints key material.
#[derive(Clone)]
pub struct SecondarySigningKey {
    inner: SigningKey,
}

impl SecondarySigningKey {
    /// Generate a random key.
    pub fn random() -> Self {
        Self {
            inner: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from a 32-byte secret scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = SigningKey::from_slice(bytes)
            .map_err(|_| SecondaryKeyError::InvalidRequest("invalid secret key".into()))?;
        Ok(Self { inner })
    }

    /// Create from a hex-encoded 32-byte secret scalar.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let mut bytes = hex::decode(hex_key.trim_start_matches("0x"))
            .map_err(|_| SecondaryKeyError::InvalidRequest("secret key is not hex".into()))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Uncompressed SEC1 public key (65 bytes).
    pub fn public_key(&self) -> Vec<u8> {
        self.inner
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    /// Sign a 32-byte prehash, returning `r || s || v` with low S and v in {0, 1}.
    pub fn sign_prehash_recoverable(
        &self,
        message_hash: &Hash,
    ) -> Result<[u8; RECOVERABLE_SIGNATURE_LENGTH]> {
        let (sig, recid) = self
            .inner
            .sign_prehash_recoverable(message_hash)
            .map_err(|_| SecondaryKeyError::SignatureVerificationFailed)?;

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        // Normalize S to the lower half (EIP-2), flipping the recovery id
        let mut v = recid.to_byte() & 1;
        if !is_low_s(&s) {
            s = invert_s(&s);
            v ^= 1;
        }

        let mut out = [0u8; RECOVERABLE_SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&r);
        out[32..64].copy_from_slice(&s);
        out[64] = v;
        Ok(out)
    }
}

impl fmt::Debug for SecondarySigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondarySigningKey")
            .field("public_key", &hex::encode(self.public_key()))
            .field("secret", &"***")
            .finish()
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn split_rs(signature: &[u8]) -> Option<([u8; 32], [u8; 32])> {
    if signature.len() != SIGNATURE_LENGTH {
        return None;
    }
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[..32]);
    s.copy_from_slice(&signature[32..]);
    Some((r, s))
}

/// Check if S value is in lower half of curve order (EIP-2 malleability protection).
///
/// Constant-time: s < SECP256K1_HALF_ORDER (strict).
fn is_low_s(s: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((s[i] < SECP256K1_HALF_ORDER[i]) as u8);
        let byte_greater = Choice::from((s[i] > SECP256K1_HALF_ORDER[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// Check if a scalar value is in valid range [1, n-1] for ECDSA.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((scalar[i] < SECP256K1_ORDER[i]) as u8);
        let byte_greater = Choice::from((scalar[i] > SECP256K1_ORDER[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    (!is_zero & less).into()
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => {
            return Err(SecondaryKeyError::RecoveryError(format!(
                "invalid recovery id {v}"
            )))
        }
    };

    RecoveryId::try_from(id)
        .map_err(|_| SecondaryKeyError::RecoveryError(format!("invalid recovery id {v}")))
}

/// Compute n - s.
fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================


// =============================================================================
// UNIT TESTS
// =============================================================================
