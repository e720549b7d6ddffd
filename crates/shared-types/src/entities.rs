//! # Core Domain Entities
//!
//! Host-side entities consumed by the secondary-key subsystem.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockContext`, `Transaction`, `SignerInfo`
//! - **Identity**: `Address`, `ValidatorAddress`

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (block header hash, Keccak-256 digest).
pub type Hash = [u8; 32];

/// A 20-byte account address as produced by the host's address codec.
pub type Address = [u8; 20];

/// A 20-byte consensus validator address.
///
/// Validator addresses and account addresses come from disjoint identity
/// domains; they never share a namespace in storage.
pub type ValidatorAddress = [u8; 20];

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// Execution context handed to every pipeline stage.
///
/// Logging goes through `tracing`, so the context carries no logger handle.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockContext {
    /// Chain identifier.
    pub chain_id: String,
    /// Height of the block being executed.
    pub height: u64,
    /// Deterministic hash of the block header at `height`.
    #[serde_as(as = "Hex")]
    pub header_hash: Hash,
}

impl BlockContext {
    /// Create a context for the given height and header hash.
    pub fn new(chain_id: impl Into<String>, height: u64, header_hash: Hash) -> Self {
        Self {
            chain_id: chain_id.into(),
            height,
            header_hash,
        }
    }
}

/// A single submitted primary signature together with its declared signer.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    /// Address derived by the host from `public_key`.
    #[serde_as(as = "Hex")]
    pub address: Address,
    /// Declared primary public key; `None` when the signer info omitted it.
    #[serde_as(as = "Option<Hex>")]
    pub public_key: Option<Vec<u8>>,
    /// Primary signature bytes.
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

/// A decoded host transaction.
///
/// Only the fields the secondary-key subsystem reads are modelled; message
/// bodies, fees and sequence numbers belong to the host.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Free-form memo string.
    pub memo: String,
    /// Declared signer addresses, in message order.
    #[serde_as(as = "Vec<Hex>")]
    pub signers: Vec<Address>,
    /// Submitted signatures, in signer-info order.
    pub signatures: Vec<SignerInfo>,
}

impl Transaction {
    /// Build a single-signer transaction carrying `memo`.
    pub fn single_signer(memo: impl Into<String>, signer: SignerInfo) -> Self {
        Self {
            memo: memo.into(),
            signers: vec![signer.address],
            signatures: vec![signer],
        }
    }
}
