//! # Key-Binding Store
//!
//! Namespaced view over the host's key-value store mapping an identity to
//! its secondary public key. Part of replicated state: writes happen only on
//! the ordered block-execution path (registration messages and proposal
//! processing).

use super::entities::{BindingIdentity, KeyBinding};
use super::errors::{Result, SecondaryKeyError};
use crate::config::RebindPolicy;
use crate::ports::outbound::KeyValueStore;
use std::sync::Arc;
use tracing::debug;

/// What a policy-checked bind did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// No binding existed; one was written.
    Created,
    /// The same key was already bound; nothing was written.
    Unchanged,
    /// A different key was replaced (only under `LastWriteWins`).
    Replaced,
}

/// Secondary-key bindings backed by a [`KeyValueStore`].
pub struct KeyBindings<S> {
    store: Arc<S>,
}

impl<S> Clone for KeyBindings<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> KeyBindings<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The bound key, if any.
    pub fn get(&self, identity: &BindingIdentity) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(&identity.store_key())?)
    }

    pub fn has(&self, identity: &BindingIdentity) -> Result<bool> {
        Ok(self.store.has(&identity.store_key())?)
    }

    /// The bound key, or `UnknownBinding`.
    pub fn require(&self, identity: &BindingIdentity) -> Result<Vec<u8>> {
        self.get(identity)?
            .ok_or_else(|| SecondaryKeyError::UnknownBinding {
                identity: identity.to_string(),
            })
    }

    /// Unconditional write. Callers apply their own policy first.
    pub fn set(&self, binding: KeyBinding) -> Result<()> {
        debug!(identity = %binding.identity, "Writing secondary key binding");
        Ok(self
            .store
            .set(&binding.identity.store_key(), binding.public_key)?)
    }

    /// Write `public_key` for `identity` subject to `policy`.
    pub fn bind(
        &self,
        identity: BindingIdentity,
        public_key: &[u8],
        policy: RebindPolicy,
    ) -> Result<BindOutcome> {
        let outcome = match self.get(&identity)? {
            None => BindOutcome::Created,
            Some(existing) if existing == public_key => return Ok(BindOutcome::Unchanged),
            Some(_) => match policy {
                RebindPolicy::FirstWriteWins => {
                    return Err(SecondaryKeyError::BindingAlreadyExists {
                        identity: identity.to_string(),
                    })
                }
                RebindPolicy::LastWriteWins => BindOutcome::Replaced,
            },
        };

        self.set(KeyBinding {
            identity,
            public_key: public_key.to_vec(),
        })?;
        Ok(outcome)
    }
}
