//! # Outbound Ports (Driven Ports / SPI)
//!
//! Capabilities supplied by the host chain: durable key-value storage and a
//! read-only view of a decoded transaction.

use crate::domain::errors::{Result, SecondaryKeyError};
use shared_types::{Address, StoreError, Transaction};

/// Deterministic, replicated key-value store.
///
/// Replaying the same sequence of `set` calls in the same order must leave
/// every replica with identical contents. Mutation happens only from the
/// strictly ordered block-execution path.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`.
    fn get(&self, key: &[u8]) -> std::result::Result<Option<Vec<u8>>, StoreError>;

    /// Whether `key` holds a value.
    fn has(&self, key: &[u8]) -> std::result::Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &[u8], value: Vec<u8>) -> std::result::Result<(), StoreError>;
}

/// Read-only view of a host transaction.
pub trait AuthTx {
    /// The memo string; empty when the transaction has none.
    fn memo(&self) -> &str;

    /// Declared signer addresses, in order.
    fn signers(&self) -> Vec<Address>;

    /// The first declared signer, backed by the first submitted signature.
    ///
    /// Fails with `TxDecodeError` when no signer is declared, the first
    /// signature is missing or belongs to another address, or it declares
    /// no public key.
    fn primary_signer(&self) -> Result<Address>;
}

impl AuthTx for Transaction {
    fn memo(&self) -> &str {
        &self.memo
    }

    fn signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    fn primary_signer(&self) -> Result<Address> {
        let declared = *self
            .signers
            .first()
            .ok_or_else(|| SecondaryKeyError::TxDecodeError("transaction declares no signers".into()))?;
        let first = self
            .signatures
            .first()
            .ok_or_else(|| SecondaryKeyError::TxDecodeError("transaction has no signatures".into()))?;

        if first.address != declared {
            return Err(SecondaryKeyError::TxDecodeError(format!(
                "first signature is from {}, expected signer {}",
                hex::encode(first.address),
                hex::encode(declared)
            )));
        }
        if first.public_key.as_ref().map_or(true, Vec::is_empty) {
            return Err(SecondaryKeyError::TxDecodeError(
                "signature has no public key".into(),
            ));
        }

        Ok(declared)
    }
}
