//! # Domain Layer
//!
//! Codec, cryptography and binding rules. No host types beyond the
//! store port.

pub mod bindings;
pub mod ecdsa;
pub mod entities;
pub mod envelope;
pub mod errors;
