//! Prepare and process callbacks.
//!
//! The proposer places the previous height's vote extensions at `txs[0]` as
//! an [`InjectedAggregateTx`]; every validator re-verifies that aggregate and
//! binds newly seen validators. The aggregate is never executed as a ledger
//! transaction; stripping it before execution is the host's job.

use super::{check_validator_signature, ValidatorCheck};
use crate::config::SecondaryKeyConfig;
use crate::domain::bindings::KeyBindings;
use crate::domain::entities::{
    AggregateEntry, BindingIdentity, InjectedAggregateTx, KeyBinding, VoteExtensionPayload,
};
use crate::domain::errors::{Result, SecondaryKeyError};
use crate::ports::outbound::KeyValueStore;
use shared_types::{
    ExtendedCommitInfo, PrepareProposalRequest, PrepareProposalResponse, ProcessProposalRequest,
    ProposalStatus, ValidatorAddress,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, info, warn};

/// A commit vote whose extension decoded and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidExtension {
    validator: ValidatorAddress,
    signature: Vec<u8>,
    check: ValidatorCheck,
}

/// Builds and checks the aggregate carried at the head of each block.
pub struct ProposalHandler<S> {
    bindings: KeyBindings<S>,
    config: SecondaryKeyConfig,
}

impl<S: KeyValueStore> ProposalHandler<S> {
    pub fn new(bindings: KeyBindings<S>, config: SecondaryKeyConfig) -> Self {
        Self { bindings, config }
    }

    /// Prepend the aggregate of the local last commit's valid extensions.
    pub fn prepare_proposal(&self, req: PrepareProposalRequest) -> Result<PrepareProposalResponse> {
        let mut valid = self.valid_extensions(&req.local_last_commit)?;
        if valid.len() > self.config.max_aggregate_entries {
            warn!(
                height = req.height,
                limit = self.config.max_aggregate_entries,
                "Aggregate entry limit reached"
            );
            valid.truncate(self.config.max_aggregate_entries);
        }

        if valid.is_empty() {
            debug!(height = req.height, "No vote extensions to inject");
            return Ok(PrepareProposalResponse { txs: req.txs });
        }

        let aggregate = InjectedAggregateTx {
            entries: valid
                .into_iter()
                .map(|ext| AggregateEntry {
                    validator: ext.validator,
                    signature: ext.signature,
                })
                .collect(),
        };

        let mut txs = Vec::with_capacity(req.txs.len() + 1);
        txs.push(aggregate.encode()?);
        txs.extend(req.txs);

        info!(
            height = req.height,
            entries = aggregate.len(),
            "Injected vote-extension aggregate"
        );
        Ok(PrepareProposalResponse { txs })
    }

    /// The first vote of each validator, in commit order, whose extension
    /// decodes and verifies over the commit's block hash.
    ///
    /// Proposer and replicas both derive the aggregate's expected contents
    /// from this, so they agree on what an honest aggregate holds. Store
    /// failures propagate; every other failure only drops the vote.
    fn valid_extensions(&self, commit: &ExtendedCommitInfo) -> Result<Vec<ValidExtension>> {
        let mut seen = BTreeSet::new();
        let mut valid = Vec::new();

        for vote in &commit.votes {
            if vote.vote_extension.is_empty() {
                continue;
            }

            let validator = hex::encode(vote.validator_address);
            if !seen.insert(vote.validator_address) {
                warn!(%validator, "Skipping duplicate vote extension");
                continue;
            }

            let payload = match VoteExtensionPayload::decode(&vote.vote_extension) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(%validator, reason = %e, "Skipping malformed vote extension");
                    continue;
                }
            };

            match check_validator_signature(
                &self.bindings,
                vote.validator_address,
                &commit.block_hash,
                &payload.signature,
            ) {
                Ok(check) => valid.push(ValidExtension {
                    validator: vote.validator_address,
                    signature: payload.signature,
                    check,
                }),
                Err(e @ SecondaryKeyError::Store(_)) => return Err(e),
                Err(e) => {
                    warn!(%validator, reason = %e, "Skipping unverifiable vote extension");
                }
            }
        }

        Ok(valid)
    }

    /// Accept or reject a proposal, binding newly seen validators on accept.
    pub fn process_proposal(&self, req: &ProcessProposalRequest) -> ProposalStatus {
        match self.check_and_bind(req) {
            Ok(()) => ProposalStatus::Accept,
            Err(e) => {
                warn!(height = req.height, code = e.code(), reason = %e, "Rejecting proposal");
                ProposalStatus::Reject
            }
        }
    }

    fn check_and_bind(&self, req: &ProcessProposalRequest) -> Result<()> {
        let commit = &req.proposed_last_commit;
        let mut valid: BTreeMap<ValidatorAddress, ValidExtension> = self
            .valid_extensions(commit)?
            .into_iter()
            .map(|ext| (ext.validator, ext))
            .collect();
        let expected = valid.len();

        if expected == 0 {
            if let Some(first) = req.txs.first() {
                if InjectedAggregateTx::decode(first).is_ok() {
                    return Err(SecondaryKeyError::InvalidRequest(
                        "aggregate present but the last commit carried no valid extensions".into(),
                    ));
                }
            }
            return Ok(());
        }

        let first = req.txs.first().ok_or_else(|| {
            SecondaryKeyError::InvalidRequest("proposal is missing the vote-extension aggregate".into())
        })?;
        let aggregate = InjectedAggregateTx::decode(first)?;

        if aggregate.is_empty() {
            return Err(SecondaryKeyError::InvalidRequest(
                "aggregate has no entries".into(),
            ));
        }
        if aggregate.len() > self.config.max_aggregate_entries {
            return Err(SecondaryKeyError::InvalidRequest(format!(
                "aggregate has {} entries, limit is {}",
                aggregate.len(),
                self.config.max_aggregate_entries
            )));
        }
        if aggregate.len() > expected {
            return Err(SecondaryKeyError::InvalidRequest(format!(
                "aggregate has {} entries for {} valid extensions",
                aggregate.len(),
                expected
            )));
        }

        let mut staged = Vec::new();

        for entry in &aggregate.entries {
            let validator = hex::encode(entry.validator);
            // Removing on use also catches a validator listed twice.
            let Some(extension) = valid.remove(&entry.validator) else {
                return Err(SecondaryKeyError::InvalidRequest(format!(
                    "validator {validator} is repeated or has no valid extension in the last commit"
                )));
            };
            if extension.signature != entry.signature {
                return Err(SecondaryKeyError::InvalidRequest(format!(
                    "entry for validator {validator} differs from its vote extension"
                )));
            }

            if let ValidatorCheck::Recovered(public_key) = extension.check {
                staged.push(KeyBinding {
                    identity: BindingIdentity::Validator(entry.validator),
                    public_key,
                });
            }
        }

        let learned = staged.len();
        for binding in staged {
            self.bindings.set(binding).map_err(|e| {
                error!(height = req.height, reason = %e, "Failed to persist validator binding");
                e
            })?;
        }

        debug!(
            height = req.height,
            entries = aggregate.len(),
            learned,
            "Vote-extension aggregate accepted"
        );
        Ok(())
    }
}
