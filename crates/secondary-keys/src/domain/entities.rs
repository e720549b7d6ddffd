//! # Domain Entities
//!
//! Bindings and the vote-extension payloads exchanged between validators.

use super::errors::{Result, SecondaryKeyError};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{Address, ValidatorAddress};
use std::fmt;

// =============================================================================
// Bindings
// =============================================================================

/// The identity a secondary key is bound to.
///
/// Accounts and validators live in separate store namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingIdentity {
    Account(Address),
    Validator(ValidatorAddress),
}

impl BindingIdentity {
    /// Namespace byte used as the store key prefix.
    pub fn namespace(&self) -> u8 {
        match self {
            Self::Account(_) => 0x00,
            Self::Validator(_) => 0x01,
        }
    }

    /// Store key: namespace byte followed by the address bytes.
    pub fn store_key(&self) -> Vec<u8> {
        let address = match self {
            Self::Account(a) | Self::Validator(a) => a,
        };
        let mut key = Vec::with_capacity(1 + address.len());
        key.push(self.namespace());
        key.extend_from_slice(address);
        key
    }
}

impl fmt::Display for BindingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(a) => write!(f, "account:{}", hex::encode(a)),
            Self::Validator(v) => write!(f, "validator:{}", hex::encode(v)),
        }
    }
}

/// "Secondary signatures of `identity` verify against `public_key`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub identity: BindingIdentity,
    pub public_key: Vec<u8>,
}

// =============================================================================
// Vote-Extension Payloads
// =============================================================================

/// A validator's vote extension: one signature over the block hash.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteExtensionPayload {
    /// 64 or 65 bytes; 65 when the recovery byte is kept.
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

impl VoteExtensionPayload {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SecondaryKeyError::InvalidRequest(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let payload: Self = serde_json::from_slice(bytes)
            .map_err(|e| SecondaryKeyError::MalformedEnvelope(e.to_string()))?;
        if payload.signature.is_empty() {
            return Err(SecondaryKeyError::MalformedEnvelope(
                "vote extension has no signature".into(),
            ));
        }
        Ok(payload)
    }
}

/// One validator's contribution to the injected aggregate.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateEntry {
    #[serde_as(as = "Hex")]
    pub validator: ValidatorAddress,
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

/// Pseudo-transaction the proposer places first in a block.
///
/// Built fresh every block from the previous height's vote extensions and
/// consumed once by proposal processing; never executed as a ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectedAggregateTx {
    pub entries: Vec<AggregateEntry>,
}

impl InjectedAggregateTx {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SecondaryKeyError::InvalidRequest(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| SecondaryKeyError::MalformedEnvelope(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
