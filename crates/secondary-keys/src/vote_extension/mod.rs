//! # Vote-Extension Protocol
//!
//! Validators learn each other's secondary keys from the signatures they
//! attach to pre-commit votes.
//!
//! ```text
//! height h:    extend_vote ──► sign(H_h) ──► gossip ──► verify_vote_extension (read-only)
//! height h+1:  prepare_proposal ──► aggregate at txs[0]
//!              process_proposal ──► verify every entry ──► bind unbound validators
//! ```
//!
//! Bindings are written only by `process_proposal`, from data carried in
//! the block itself, so every replica learns the same keys at the same
//! height.

pub mod extend;
pub mod proposal;

pub use extend::VoteExtensionHandler;
pub use proposal::ProposalHandler;

use crate::domain::bindings::KeyBindings;
use crate::domain::ecdsa::{recover, strip_recovery_byte, verify};
use crate::domain::entities::BindingIdentity;
use crate::domain::errors::{Result, SecondaryKeyError};
use crate::ports::outbound::KeyValueStore;
use shared_types::{Hash, ValidatorAddress};

/// Result of checking one validator signature over a block hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValidatorCheck {
    /// Verified against the stored binding.
    Bound,
    /// No binding yet; verified against the key recovered from the signature.
    Recovered(Vec<u8>),
}

/// Verify `signature` over `block_hash` for `validator`.
///
/// Bound validators are checked against their stored key. Unbound ones need
/// the 65-byte form so the key can be recovered. Never writes.
pub(crate) fn check_validator_signature<S: KeyValueStore>(
    bindings: &KeyBindings<S>,
    validator: ValidatorAddress,
    block_hash: &Hash,
    signature: &[u8],
) -> Result<ValidatorCheck> {
    let identity = BindingIdentity::Validator(validator);

    if let Some(bound) = bindings.get(&identity)? {
        return if verify(&bound, block_hash, strip_recovery_byte(signature)) {
            Ok(ValidatorCheck::Bound)
        } else {
            Err(SecondaryKeyError::SignatureVerificationFailed)
        };
    }

    let recovered = recover(block_hash, signature)?;
    if !verify(&recovered, block_hash, strip_recovery_byte(signature)) {
        return Err(SecondaryKeyError::SignatureVerificationFailed);
    }
    Ok(ValidatorCheck::Recovered(recovered))
}
