//! # Secondary-Key Errors
//!
//! Every variant is terminal for the unit of work it occurs in: a rejected
//! transaction, an excluded vote extension, or a rejected proposal. Nothing
//! here is retried.

use crate::config::ConfigError;
use shared_types::StoreError;
use thiserror::Error;

/// Errors raised by the secondary-key subsystem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecondaryKeyError {
    /// The envelope could not be decoded (empty, truncated, not a record).
    #[error("Malformed secondary signature envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope decoded but a required field is empty.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The host transaction does not have the expected shape.
    #[error("Transaction decode error: {0}")]
    TxDecodeError(String),

    /// The signer has no registered secondary key.
    #[error("No secondary key bound for {identity}")]
    UnknownBinding { identity: String },

    /// The declared public key differs from the bound key.
    #[error("Declared secondary key does not match the bound key for {identity}")]
    InvalidSecondaryKey { identity: String },

    /// The signature does not verify against the expected key.
    #[error("Secondary signature verification failed")]
    SignatureVerificationFailed,

    /// No public key could be recovered from the signature.
    #[error("Failed to recover public key: {0}")]
    RecoveryError(String),

    /// A different key is already bound and rebinding is not allowed.
    #[error("A different secondary key is already bound for {identity}")]
    BindingAlreadyExists { identity: String },

    /// The key-value store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The subsystem is misconfigured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SecondaryKeyError {
    /// Stable code attached to failed-transaction results.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope(_) => "MALFORMED_ENVELOPE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::TxDecodeError(_) => "TX_DECODE_ERROR",
            Self::UnknownBinding { .. } => "UNKNOWN_BINDING",
            Self::InvalidSecondaryKey { .. } => "INVALID_SECONDARY_PUBLIC_KEY",
            Self::SignatureVerificationFailed => "SIGNATURE_VERIFICATION_FAILED",
            Self::RecoveryError(_) => "RECOVERY_ERROR",
            Self::BindingAlreadyExists { .. } => "BINDING_ALREADY_EXISTS",
            Self::Store(_) => "STORE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SecondaryKeyError>;
