//! Extend and verify callbacks.
//!
//! `extend_vote` runs only on the local validator; `verify_vote_extension`
//! runs on every validator for every peer vote. Neither touches replicated
//! state.

use super::{check_validator_signature, ValidatorCheck};
use crate::config::{ConfigError, SecondaryKeyConfig};
use crate::domain::bindings::KeyBindings;
use crate::domain::ecdsa::SecondarySigningKey;
use crate::domain::entities::VoteExtensionPayload;
use crate::domain::errors::Result;
use crate::ports::outbound::KeyValueStore;
use shared_types::{
    ExtendVoteRequest, ExtendVoteResponse, VerifyStatus, VerifyVoteExtensionRequest,
};
use tracing::{debug, warn};

/// Produces this validator's extension and judges peers' extensions.
pub struct VoteExtensionHandler<S> {
    bindings: KeyBindings<S>,
    config: SecondaryKeyConfig,
    signing_key: Option<SecondarySigningKey>,
}

impl<S: KeyValueStore> VoteExtensionHandler<S> {
    /// A handler that can verify but not extend.
    pub fn new(bindings: KeyBindings<S>, config: SecondaryKeyConfig) -> Self {
        Self {
            bindings,
            config,
            signing_key: None,
        }
    }

    pub fn with_signing_key(mut self, key: SecondarySigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Sign the block hash with this validator's secondary key.
    pub fn extend_vote(&self, req: &ExtendVoteRequest) -> Result<ExtendVoteResponse> {
        if !self.config.vote_extensions_enabled(req.height) {
            return Ok(ExtendVoteResponse::default());
        }

        let key = self
            .signing_key
            .as_ref()
            .ok_or(ConfigError::MissingValidatorKey)?;

        let signature = key.sign_prehash_recoverable(&req.hash)?;
        let vote_extension = VoteExtensionPayload {
            signature: signature.to_vec(),
        }
        .encode()?;

        debug!(height = req.height, "Extended vote with secondary signature");
        Ok(ExtendVoteResponse { vote_extension })
    }

    /// Accept or reject a peer's extension. Rejection only drops the vote
    /// from quorum accounting.
    pub fn verify_vote_extension(&self, req: &VerifyVoteExtensionRequest) -> VerifyStatus {
        let validator = hex::encode(req.validator_address);

        if req.vote_extension.is_empty() {
            return if self.config.vote_extensions_enabled(req.height) {
                warn!(height = req.height, %validator, "Rejecting vote: missing extension");
                VerifyStatus::Reject
            } else {
                VerifyStatus::Accept
            };
        }

        let payload = match VoteExtensionPayload::decode(&req.vote_extension) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(height = req.height, %validator, reason = %e, "Rejecting vote: undecodable extension");
                return VerifyStatus::Reject;
            }
        };

        match check_validator_signature(
            &self.bindings,
            req.validator_address,
            &req.hash,
            &payload.signature,
        ) {
            Ok(ValidatorCheck::Bound) => {
                debug!(height = req.height, %validator, "Vote extension verified");
                VerifyStatus::Accept
            }
            Ok(ValidatorCheck::Recovered(_)) => {
                debug!(height = req.height, %validator, "Vote extension verified against recovered key");
                VerifyStatus::Accept
            }
            Err(e) => {
                warn!(height = req.height, %validator, reason = %e, "Rejecting vote: bad extension signature");
                VerifyStatus::Reject
            }
        }
    }
}
