//! # Consensus Engine Requests
//!
//! Request/response shapes for the vote-extension and proposal callbacks the
//! host consensus engine invokes each height. Transport, gossip and vote
//! signing stay inside the engine.

use crate::entities::{Hash, ValidatorAddress};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Request to produce this validator's vote extension.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendVoteRequest {
    /// Height being voted on.
    pub height: u64,
    /// Hash of the block being pre-committed.
    #[serde_as(as = "Hex")]
    pub hash: Hash,
}

/// This validator's vote extension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtendVoteResponse {
    /// Opaque payload gossiped with the pre-commit. Empty means "no extension".
    pub vote_extension: Vec<u8>,
}

/// Request to verify a peer's vote extension.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyVoteExtensionRequest {
    /// Height the vote belongs to.
    pub height: u64,
    /// Hash of the block the peer pre-committed.
    #[serde_as(as = "Hex")]
    pub hash: Hash,
    /// Validator that produced the extension.
    #[serde_as(as = "Hex")]
    pub validator_address: ValidatorAddress,
    /// The extension payload.
    pub vote_extension: Vec<u8>,
}

/// Outcome of vote-extension verification.
///
/// `Reject` only removes the peer's vote from quorum accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyStatus {
    Accept,
    Reject,
}

/// A pre-commit vote from the previous height, with its extension.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedVoteInfo {
    #[serde_as(as = "Hex")]
    pub validator_address: ValidatorAddress,
    /// Empty when the validator attached no extension.
    pub vote_extension: Vec<u8>,
}

/// The previous height's commit, as seen by the engine.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtendedCommitInfo {
    /// Height of the committed block.
    pub height: u64,
    /// Hash of the committed block; the message every extension signed.
    #[serde_as(as = "Hex")]
    pub block_hash: Hash,
    /// Votes in engine order.
    pub votes: Vec<ExtendedVoteInfo>,
}

impl ExtendedCommitInfo {
    /// Number of votes that carried a non-empty extension.
    pub fn extension_count(&self) -> usize {
        self.votes
            .iter()
            .filter(|v| !v.vote_extension.is_empty())
            .count()
    }
}

/// Request to build a block proposal (proposer only).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrepareProposalRequest {
    pub height: u64,
    /// Candidate transactions from the mempool.
    pub txs: Vec<Vec<u8>>,
    /// The proposer's local view of the previous height's commit.
    pub local_last_commit: ExtendedCommitInfo,
}

/// The proposer's final transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrepareProposalResponse {
    pub txs: Vec<Vec<u8>>,
}

/// Request to validate a received proposal (every validator).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessProposalRequest {
    pub height: u64,
    pub txs: Vec<Vec<u8>>,
    /// The previous height's commit the proposal builds on.
    pub proposed_last_commit: ExtendedCommitInfo,
}

/// Outcome of proposal processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Accept,
    Reject,
}
