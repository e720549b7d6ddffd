//! # Key Registration
//!
//! Handles `MsgRegisterSecondaryKey`: an account proves possession of a
//! secondary key and binds it to its address. Runs on the ordered
//! block-execution path; a failed registration writes nothing.

use crate::config::SecondaryKeyConfig;
use crate::domain::bindings::{BindOutcome, KeyBindings};
use crate::domain::ecdsa::{account_message_hash, verify};
use crate::domain::entities::BindingIdentity;
use crate::domain::envelope::SecondarySignature;
use crate::domain::errors::{Result, SecondaryKeyError};
use crate::ports::outbound::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{Address, BlockContext};
use tracing::{info, warn};

/// Bind the secondary key carried in `envelope` to `sender`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegisterSecondaryKey {
    #[serde_as(as = "Hex")]
    pub sender: Address,
    /// Encoded envelope, optionally preceded by the memo prefix.
    #[serde_as(as = "Hex")]
    pub envelope: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegisterSecondaryKeyResponse {}

/// Message server for secondary-key registration.
pub struct RegistrationHandler<S> {
    bindings: KeyBindings<S>,
    config: SecondaryKeyConfig,
}

impl<S: KeyValueStore> RegistrationHandler<S> {
    pub fn new(bindings: KeyBindings<S>, config: SecondaryKeyConfig) -> Self {
        Self { bindings, config }
    }

    pub fn register_secondary_key(
        &self,
        ctx: &BlockContext,
        msg: MsgRegisterSecondaryKey,
    ) -> Result<MsgRegisterSecondaryKeyResponse> {
        let sender = hex::encode(msg.sender);

        let body = msg
            .envelope
            .strip_prefix(self.config.memo_prefix.as_bytes())
            .unwrap_or(msg.envelope.as_slice());

        let envelope = SecondarySignature::decode(body).map_err(|e| {
            warn!(height = ctx.height, %sender, reason = %e, "Registration rejected: malformed envelope");
            e
        })?;
        envelope.validate()?;

        let hash = account_message_hash(&envelope.public_key);
        if !verify(&envelope.public_key, &hash, &envelope.signature) {
            warn!(height = ctx.height, %sender, "Registration rejected: proof of possession failed");
            return Err(SecondaryKeyError::SignatureVerificationFailed);
        }

        let outcome = self.bindings.bind(
            BindingIdentity::Account(msg.sender),
            &envelope.public_key,
            self.config.account_rebind_policy,
        )?;

        match outcome {
            BindOutcome::Created => {
                info!(height = ctx.height, %sender, "Registered secondary key")
            }
            BindOutcome::Replaced => {
                info!(height = ctx.height, %sender, "Replaced secondary key")
            }
            BindOutcome::Unchanged => {
                info!(height = ctx.height, %sender, "Secondary key already registered")
            }
        }

        Ok(MsgRegisterSecondaryKeyResponse {})
    }
}
