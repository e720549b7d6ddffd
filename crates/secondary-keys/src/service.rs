//! # Secondary-Key Service
//!
//! Application service implementing [`SecondaryKeyApi`] over one shared
//! binding store. Hosts either call it directly or take the decorator out of
//! it with [`SecondaryKeyService::ante_decorator`] and place it in their own
//! [`AnteChain`](crate::ante::AnteChain).

use crate::ante::{SecondaryAuthOutcome, SecondarySignatureDecorator};
use crate::config::SecondaryKeyConfig;
use crate::domain::bindings::KeyBindings;
use crate::domain::ecdsa::SecondarySigningKey;
use crate::domain::entities::BindingIdentity;
use crate::domain::errors::Result;
use crate::ports::inbound::SecondaryKeyApi;
use crate::ports::outbound::{AuthTx, KeyValueStore};
use crate::registration::{
    MsgRegisterSecondaryKey, MsgRegisterSecondaryKeyResponse, RegistrationHandler,
};
use crate::vote_extension::{ProposalHandler, VoteExtensionHandler};
use shared_types::{
    BlockContext, ExtendVoteRequest, ExtendVoteResponse, PrepareProposalRequest,
    PrepareProposalResponse, ProcessProposalRequest, ProposalStatus, VerifyStatus,
    VerifyVoteExtensionRequest,
};
use std::sync::Arc;
use tracing::info;

pub struct SecondaryKeyService<S> {
    bindings: KeyBindings<S>,
    config: SecondaryKeyConfig,
    decorator: SecondarySignatureDecorator<S>,
    registration: RegistrationHandler<S>,
    vote_extensions: VoteExtensionHandler<S>,
    proposals: ProposalHandler<S>,
}

impl<S: KeyValueStore> SecondaryKeyService<S> {
    /// Validate `config` and wire every handler to `store`.
    pub fn new(store: Arc<S>, config: SecondaryKeyConfig) -> Result<Self> {
        config.validate()?;
        let bindings = KeyBindings::new(store);

        info!(
            memo_prefix = %config.memo_prefix,
            policy = ?config.account_rebind_policy,
            "Secondary-key service ready"
        );

        Ok(Self {
            decorator: SecondarySignatureDecorator::new(bindings.clone(), config.clone()),
            registration: RegistrationHandler::new(bindings.clone(), config.clone()),
            vote_extensions: VoteExtensionHandler::new(bindings.clone(), config.clone()),
            proposals: ProposalHandler::new(bindings.clone(), config.clone()),
            bindings,
            config,
        })
    }

    /// Enable `extend_vote` on this node.
    pub fn with_signing_key(mut self, key: SecondarySigningKey) -> Self {
        self.vote_extensions = self.vote_extensions.with_signing_key(key);
        self
    }

    pub fn config(&self) -> &SecondaryKeyConfig {
        &self.config
    }

    /// A decorator sharing this service's store, for a host pipeline.
    pub fn ante_decorator(&self) -> SecondarySignatureDecorator<S> {
        SecondarySignatureDecorator::new(self.bindings.clone(), self.config.clone())
    }

    /// Like [`SecondaryKeyApi::authenticate_tx`] but reports which branch
    /// let the transaction through.
    pub fn authenticate_tx_outcome(
        &self,
        ctx: &BlockContext,
        tx: &dyn AuthTx,
        simulate: bool,
    ) -> Result<SecondaryAuthOutcome> {
        self.decorator.authenticate(ctx, tx, simulate)
    }
}

impl<S: KeyValueStore> SecondaryKeyApi for SecondaryKeyService<S> {
    fn authenticate_tx(&self, ctx: &BlockContext, tx: &dyn AuthTx, simulate: bool) -> Result<()> {
        self.decorator.authenticate(ctx, tx, simulate).map(|_| ())
    }

    fn register_secondary_key(
        &self,
        ctx: &BlockContext,
        msg: MsgRegisterSecondaryKey,
    ) -> Result<MsgRegisterSecondaryKeyResponse> {
        self.registration.register_secondary_key(ctx, msg)
    }

    fn extend_vote(&self, req: &ExtendVoteRequest) -> Result<ExtendVoteResponse> {
        self.vote_extensions.extend_vote(req)
    }

    fn verify_vote_extension(&self, req: &VerifyVoteExtensionRequest) -> VerifyStatus {
        self.vote_extensions.verify_vote_extension(req)
    }

    fn prepare_proposal(&self, req: PrepareProposalRequest) -> Result<PrepareProposalResponse> {
        self.proposals.prepare_proposal(req)
    }

    fn process_proposal(&self, req: &ProcessProposalRequest) -> ProposalStatus {
        self.proposals.process_proposal(req)
    }

    fn secondary_key(&self, identity: &BindingIdentity) -> Result<Option<Vec<u8>>> {
        self.bindings.get(identity)
    }
}
