//! # Secondary-Key Authentication
//!
//! A second, independent signature factor for chain transactions, plus a
//! vote-extension protocol through which validators learn each other's
//! secondary keys on first use.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): envelope codec, secp256k1/Keccak-256
//!   verifier, key bindings
//! - **Ports Layer** (`ports/`): the host's key-value store and transaction
//!   view (outbound), the subsystem API (inbound)
//! - **Handlers**: the authentication decorator (`ante/`), key registration
//!   (`registration`), and the consensus callbacks (`vote_extension/`)
//! - **Service Layer** (`service.rs`): wires the handlers to one store
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: high-S signatures are rejected
//! - **Replicated Bindings**: validator keys are bound only while processing
//!   a proposal, never from a node-local verification callback
//! - **First Write Wins**: a bound validator key is never replaced; account
//!   rebinding follows [`RebindPolicy`]

pub mod adapters;
pub mod ante;
pub mod config;
pub mod domain;
pub mod ports;
pub mod registration;
pub mod service;
pub mod vote_extension;

// Re-export public API
pub use adapters::InMemoryKeyValueStore;
pub use ante::{AnteChain, AnteDecorator, AnteError, SecondaryAuthOutcome, SecondarySignatureDecorator};
pub use config::{validator_key_from_env, validator_key_from_lookup, ConfigError, RebindPolicy, SecondaryKeyConfig};
pub use domain::bindings::{BindOutcome, KeyBindings};
pub use domain::ecdsa::{account_message_hash, keccak256, recover, verify, SecondarySigningKey};
pub use domain::entities::{
    AggregateEntry, BindingIdentity, InjectedAggregateTx, KeyBinding, VoteExtensionPayload,
};
pub use domain::envelope::{decode_memo, encode_memo, SecondarySignature};
pub use domain::errors::{Result, SecondaryKeyError};
pub use ports::inbound::SecondaryKeyApi;
pub use ports::outbound::{AuthTx, KeyValueStore};
pub use registration::{MsgRegisterSecondaryKey, MsgRegisterSecondaryKeyResponse, RegistrationHandler};
pub use service::SecondaryKeyService;
pub use vote_extension::{ProposalHandler, VoteExtensionHandler};
