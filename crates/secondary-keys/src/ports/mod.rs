//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API the host chain calls
//! - **Outbound (Driven)**: Host capabilities this subsystem needs

pub mod inbound;
pub mod outbound;
