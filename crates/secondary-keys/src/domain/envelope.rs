//! # Secondary Signature Envelope
//!
//! Wire codec for `{public_key, signature}` as carried in a transaction memo
//! or a registration message.
//!
//! ## Wire Format
//!
//! ```text
//! memo     := PREFIX envelope
//! envelope := {"public_key":"<hex>","signature":"<hex>"}
//! ```
//!
//! A memo that does not start with the prefix carries no secondary
//! signature; that is not an error.

use super::ecdsa::{account_message_hash, strip_recovery_byte, SecondarySigningKey};
use super::errors::{Result, SecondaryKeyError};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// A secondary public key with a signature made by its private key.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecondarySignature {
    #[serde_as(as = "Hex")]
    pub public_key: Vec<u8>,
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

impl SecondarySignature {
    pub fn new(public_key: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    /// Produce the account-path envelope for `key`: a signature over
    /// `keccak256(public_key)`, recovery byte dropped.
    pub fn sign_account(key: &SecondarySigningKey) -> Result<Self> {
        let public_key = key.public_key();
        let signature = key.sign_prehash_recoverable(&account_message_hash(&public_key))?;
        Ok(Self::new(
            public_key,
            strip_recovery_byte(&signature).to_vec(),
        ))
    }

    /// Both fields must be present.
    pub fn validate(&self) -> Result<()> {
        if self.public_key.is_empty() {
            return Err(SecondaryKeyError::InvalidRequest(
                "missing public key".into(),
            ));
        }
        if self.signature.is_empty() {
            return Err(SecondaryKeyError::InvalidRequest("missing signature".into()));
        }
        Ok(())
    }

    /// Serialize the envelope.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.validate()?;
        serde_json::to_vec(self).map_err(|e| SecondaryKeyError::InvalidRequest(e.to_string()))
    }

    /// Parse an envelope, normalizing a 65-byte signature to 64 bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(SecondaryKeyError::MalformedEnvelope("empty envelope".into()));
        }

        let mut envelope: Self = serde_json::from_slice(bytes)
            .map_err(|e| SecondaryKeyError::MalformedEnvelope(e.to_string()))?;

        envelope.signature = strip_recovery_byte(&envelope.signature).to_vec();
        Ok(envelope)
    }
}

/// Build a memo string: `prefix` immediately followed by the envelope.
pub fn encode_memo(envelope: &SecondarySignature, prefix: &str) -> Result<String> {
    let bytes = envelope.encode()?;
    let body =
        String::from_utf8(bytes).map_err(|e| SecondaryKeyError::InvalidRequest(e.to_string()))?;
    Ok(format!("{prefix}{body}"))
}

/// Extract the envelope from a memo.
///
/// `Ok(None)` when the memo lacks `prefix`; `MalformedEnvelope` when the
/// prefix is present but what follows does not decode.
pub fn decode_memo(memo: &str, prefix: &str) -> Result<Option<SecondarySignature>> {
    match memo.strip_prefix(prefix) {
        Some(body) => SecondarySignature::decode(body.as_bytes()).map(Some),
        None => Ok(None),
    }
}
