//! # Error Types
//!
//! Defines error types shared between the host and the secondary-key subsystem.

use thiserror::Error;

/// Errors surfaced by the host's persistent key-value capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The stored bytes could not be interpreted.
    #[error("Corrupted value under key {key}")]
    Corrupted { key: String },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}
