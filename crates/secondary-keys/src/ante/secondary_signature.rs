//! # Secondary Signature Decorator
//!
//! Checks the secondary factor of a transaction against the key bound to its
//! primary signer. Read-only: bindings are never written here.
//!
//! ## Decision Flow
//!
//! ```text
//! simulate / genesis ──────────────────────────────► forward
//! memo empty ──────────────────────────────────────► forward
//! memo lacks prefix ───────────────────────────────► forward
//! decode ──────────── fails ───────────────────────► MalformedEnvelope
//! validate ────────── empty field ─────────────────► InvalidRequest
//! resolve signer ──── no signature / no pubkey ────► TxDecodeError
//! lookup binding ──── none ────────────────────────► UnknownBinding
//! declared == bound ─ no ──────────────────────────► InvalidSecondaryKey
//! verify ──────────── fails ───────────────────────► SignatureVerificationFailed
//!                                                    forward
//! ```

use super::{AnteDecorator, AnteError};
use crate::config::SecondaryKeyConfig;
use crate::domain::bindings::KeyBindings;
use crate::domain::ecdsa::{account_message_hash, verify};
use crate::domain::entities::BindingIdentity;
use crate::domain::envelope::decode_memo;
use crate::domain::errors::{Result, SecondaryKeyError};
use crate::ports::outbound::{AuthTx, KeyValueStore};
use shared_types::BlockContext;
use tracing::{debug, warn};

/// How a transaction got through the decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryAuthOutcome {
    /// Simulation or genesis execution.
    Bypassed,
    /// The transaction has no memo.
    NoMemo,
    /// The memo does not carry a secondary signature.
    NoPrefix,
    /// The secondary signature matched the bound key.
    Verified,
}

/// Pipeline stage enforcing the secondary factor.
pub struct SecondarySignatureDecorator<S> {
    bindings: KeyBindings<S>,
    config: SecondaryKeyConfig,
}

impl<S: KeyValueStore> SecondarySignatureDecorator<S> {
    pub fn new(bindings: KeyBindings<S>, config: SecondaryKeyConfig) -> Self {
        Self { bindings, config }
    }

    /// Run the decision flow and report which branch let the tx through.
    pub fn authenticate(
        &self,
        ctx: &BlockContext,
        tx: &dyn AuthTx,
        simulate: bool,
    ) -> Result<SecondaryAuthOutcome> {
        if simulate || ctx.height == self.config.genesis_height {
            debug!(height = ctx.height, simulate, "Secondary signature check bypassed");
            return Ok(SecondaryAuthOutcome::Bypassed);
        }

        let memo = tx.memo();
        if memo.is_empty() {
            return Ok(SecondaryAuthOutcome::NoMemo);
        }

        let Some(envelope) = decode_memo(memo, &self.config.memo_prefix).map_err(|e| {
            debug!(height = ctx.height, reason = %e, "Rejecting tx: malformed envelope");
            e
        })?
        else {
            debug!(height = ctx.height, "Memo carries no secondary signature");
            return Ok(SecondaryAuthOutcome::NoPrefix);
        };

        envelope.validate().map_err(|e| {
            debug!(height = ctx.height, reason = %e, "Rejecting tx: incomplete envelope");
            e
        })?;

        let signer = tx.primary_signer().map_err(|e| {
            debug!(height = ctx.height, reason = %e, "Rejecting tx: cannot resolve signer");
            e
        })?;
        let identity = BindingIdentity::Account(signer);

        let bound_key = self.bindings.require(&identity).map_err(|e| {
            debug!(height = ctx.height, %identity, "Rejecting tx: no secondary key bound");
            e
        })?;

        if bound_key != envelope.public_key {
            warn!(height = ctx.height, %identity, "Rejecting tx: declared secondary key differs from binding");
            return Err(SecondaryKeyError::InvalidSecondaryKey {
                identity: identity.to_string(),
            });
        }

        if !verify(
            &bound_key,
            &account_message_hash(&bound_key),
            &envelope.signature,
        ) {
            warn!(height = ctx.height, %identity, "Rejecting tx: secondary signature invalid");
            return Err(SecondaryKeyError::SignatureVerificationFailed);
        }

        debug!(height = ctx.height, %identity, "Secondary signature verified");
        Ok(SecondaryAuthOutcome::Verified)
    }
}

impl<S: KeyValueStore> AnteDecorator for SecondarySignatureDecorator<S> {
    fn name(&self) -> &'static str {
        "secondary_signature"
    }

    fn ante_handle(
        &self,
        ctx: BlockContext,
        tx: &dyn AuthTx,
        simulate: bool,
    ) -> std::result::Result<BlockContext, AnteError> {
        self.authenticate(&ctx, tx, simulate)?;
        Ok(ctx)
    }
}
