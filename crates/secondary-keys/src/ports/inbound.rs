//! # Inbound Ports (Driving Ports / API)
//!
//! What the host chain calls: transaction authentication, the registration
//! message, and the consensus-engine callbacks.

use crate::domain::entities::BindingIdentity;
use crate::domain::errors::Result;
use crate::ports::outbound::AuthTx;
use crate::registration::{MsgRegisterSecondaryKey, MsgRegisterSecondaryKeyResponse};
use shared_types::{
    BlockContext, ExtendVoteRequest, ExtendVoteResponse, PrepareProposalRequest,
    PrepareProposalResponse, ProcessProposalRequest, ProposalStatus, VerifyStatus,
    VerifyVoteExtensionRequest,
};

/// Secondary-key subsystem API.
///
/// Every method is deterministic given the store contents, except
/// `extend_vote`, which depends on the node-local signing key.
pub trait SecondaryKeyApi {
    /// Check a transaction's secondary signature. Never writes.
    fn authenticate_tx(&self, ctx: &BlockContext, tx: &dyn AuthTx, simulate: bool) -> Result<()>;

    /// Bind a secondary key to the message sender.
    fn register_secondary_key(
        &self,
        ctx: &BlockContext,
        msg: MsgRegisterSecondaryKey,
    ) -> Result<MsgRegisterSecondaryKeyResponse>;

    fn extend_vote(&self, req: &ExtendVoteRequest) -> Result<ExtendVoteResponse>;

    fn verify_vote_extension(&self, req: &VerifyVoteExtensionRequest) -> VerifyStatus;

    fn prepare_proposal(&self, req: PrepareProposalRequest) -> Result<PrepareProposalResponse>;

    /// Validate a proposal and bind validators first seen in its aggregate.
    fn process_proposal(&self, req: &ProcessProposalRequest) -> ProposalStatus;

    /// The key bound to `identity`, if any.
    fn secondary_key(&self, identity: &BindingIdentity) -> Result<Option<Vec<u8>>>;
}
