//! # Authentication Pipeline
//!
//! Transactions pass through an ordered list of decorators before execution.
//! Each decorator either forwards the (possibly updated) context or rejects
//! the transaction; the first rejection ends the pipeline.
//!
//! ```text
//! setup → validate-basic → fees → signatures → [secondary signature] → increment sequence
//! ```
//!
//! Only the secondary-signature stage lives in this crate; the others are
//! supplied by the host.

pub mod secondary_signature;

pub use secondary_signature::{SecondaryAuthOutcome, SecondarySignatureDecorator};

use crate::domain::errors::SecondaryKeyError;
use crate::ports::outbound::AuthTx;
use shared_types::BlockContext;
use thiserror::Error;
use tracing::debug;

/// Why a decorator rejected a transaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnteError {
    /// Rejected by the secondary-signature stage.
    #[error(transparent)]
    SecondaryKey(#[from] SecondaryKeyError),

    /// Rejected by a host stage.
    #[error("{stage}: {reason}")]
    Host { stage: &'static str, reason: String },
}

impl AnteError {
    /// Stable error code for failed-transaction results.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SecondaryKey(e) => e.code(),
            Self::Host { .. } => "HOST_REJECTED",
        }
    }
}

/// One stage of the authentication pipeline.
pub trait AnteDecorator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Forward `ctx` (possibly updated) to the next stage, or reject.
    fn ante_handle(
        &self,
        ctx: BlockContext,
        tx: &dyn AuthTx,
        simulate: bool,
    ) -> Result<BlockContext, AnteError>;
}

/// An ordered pipeline of decorators run in sequence.
#[derive(Default)]
pub struct AnteChain {
    decorators: Vec<Box<dyn AnteDecorator>>,
}

impl AnteChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in insertion order.
    pub fn with(mut self, decorator: impl AnteDecorator + 'static) -> Self {
        self.decorators.push(Box::new(decorator));
        self
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> Vec<&'static str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }

    /// Run every stage; stop at the first rejection.
    pub fn run(
        &self,
        mut ctx: BlockContext,
        tx: &dyn AuthTx,
        simulate: bool,
    ) -> Result<BlockContext, AnteError> {
        for decorator in &self.decorators {
            ctx = decorator.ante_handle(ctx, tx, simulate).map_err(|e| {
                debug!(stage = decorator.name(), code = e.code(), "Ante stage rejected tx");
                e
            })?;
        }
        Ok(ctx)
    }
}
