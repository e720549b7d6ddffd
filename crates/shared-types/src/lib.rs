//! # Shared Types Crate
//!
//! Host-facing entities and consensus request types consumed by the
//! secondary-key subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses the boundary between
//!   the host chain and the subsystem is defined here.
//! - **Host Owns Identity**: Addresses are produced by the host's address
//!   codec; this crate never derives them.

pub mod consensus;
pub mod entities;
pub mod errors;

pub use consensus::*;
pub use entities::*;
pub use errors::*;
