//! Cross-component flows.

pub mod account_flow;
pub mod vote_extension_flow;
