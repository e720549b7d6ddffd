//! # Secondary-Key Configuration
//!
//! Chain-wide parameters for the secondary-key subsystem. Every validator
//! must run with identical values; they feed consensus decisions.
//!
//! Defaults are overridable from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `SK_MEMO_PREFIX` | `memo_prefix` |
//! | `SK_GENESIS_HEIGHT` | `genesis_height` |
//! | `SK_VOTE_EXTENSIONS_ENABLE_HEIGHT` | `vote_extensions_enable_height` |
//! | `SK_MAX_AGGREGATE_ENTRIES` | `max_aggregate_entries` |
//! | `SK_ACCOUNT_REBIND_POLICY` | `account_rebind_policy` |
//! | `SK_VALIDATOR_SECONDARY_KEY` | validator signing key (hex, node-local) |

use crate::domain::ecdsa::SecondarySigningKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Literal prefix marking a memo that carries a secondary signature.
pub const DEFAULT_MEMO_PREFIX: &str = "SECONDARY";

/// Environment variable holding the validator's secondary key (hex).
pub const VALIDATOR_KEY_ENV: &str = "SK_VALIDATOR_SECONDARY_KEY";

/// How an account registration treats an already-bound identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebindPolicy {
    /// The first registered key is final. Re-registering the same key is a
    /// no-op; a different key is rejected.
    #[default]
    FirstWriteWins,
    /// Every successful registration overwrites the previous binding.
    LastWriteWins,
}

impl FromStr for RebindPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_write_wins" => Ok(Self::FirstWriteWins),
            "last_write_wins" => Ok(Self::LastWriteWins),
            other => Err(ConfigError::UnknownRebindPolicy(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Memo prefix must not be empty")]
    EmptyMemoPrefix,

    #[error("Memo prefix must be printable ASCII: {0:?}")]
    NonAsciiMemoPrefix(String),

    #[error("max_aggregate_entries must be greater than zero")]
    ZeroAggregateBound,

    #[error("Unknown rebind policy: {0}")]
    UnknownRebindPolicy(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnvValue { var: &'static str, value: String },

    #[error("Validator secondary key is not configured")]
    MissingValidatorKey,

    #[error("Invalid validator secondary key")]
    InvalidValidatorKey,
}

/// Secondary-key subsystem configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryKeyConfig {
    /// Memo prefix that introduces a secondary-signature envelope.
    pub memo_prefix: String,
    /// Height at which genesis transactions execute; the decorator is
    /// bypassed there.
    pub genesis_height: u64,
    /// First height at which validators attach vote extensions.
    pub vote_extensions_enable_height: u64,
    /// Upper bound on entries in an injected aggregate.
    pub max_aggregate_entries: usize,
    /// Rebinding behaviour for account registrations.
    pub account_rebind_policy: RebindPolicy,
}

impl Default for SecondaryKeyConfig {
    fn default() -> Self {
        Self {
            memo_prefix: DEFAULT_MEMO_PREFIX.to_string(),
            genesis_height: 0,
            vote_extensions_enable_height: 1,
            max_aggregate_entries: 10_000,
            account_rebind_policy: RebindPolicy::FirstWriteWins,
        }
    }
}

impl SecondaryKeyConfig {
    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memo_prefix.is_empty() {
            return Err(ConfigError::EmptyMemoPrefix);
        }
        if !self
            .memo_prefix
            .bytes()
            .all(|b| b.is_ascii_graphic() || b == b' ')
        {
            return Err(ConfigError::NonAsciiMemoPrefix(self.memo_prefix.clone()));
        }
        if self.max_aggregate_entries == 0 {
            return Err(ConfigError::ZeroAggregateBound);
        }
        Ok(())
    }

    /// Whether vote extensions are produced and expected at `height`.
    pub fn vote_extensions_enabled(&self, height: u64) -> bool {
        self.vote_extensions_enable_height > 0 && height >= self.vote_extensions_enable_height
    }

    /// Load defaults, apply environment overrides, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup("SK_MEMO_PREFIX") {
            config.memo_prefix = prefix;
        }
        if let Some(value) = lookup("SK_GENESIS_HEIGHT") {
            config.genesis_height = parse_env("SK_GENESIS_HEIGHT", value)?;
        }
        if let Some(value) = lookup("SK_VOTE_EXTENSIONS_ENABLE_HEIGHT") {
            config.vote_extensions_enable_height =
                parse_env("SK_VOTE_EXTENSIONS_ENABLE_HEIGHT", value)?;
        }
        if let Some(value) = lookup("SK_MAX_AGGREGATE_ENTRIES") {
            config.max_aggregate_entries = parse_env("SK_MAX_AGGREGATE_ENTRIES", value)?;
        }
        if let Some(value) = lookup("SK_ACCOUNT_REBIND_POLICY") {
            config.account_rebind_policy = value.parse()?;
        }

        config.validate()?;
        info!(
            memo_prefix = %config.memo_prefix,
            enable_height = config.vote_extensions_enable_height,
            policy = ?config.account_rebind_policy,
            "Loaded secondary-key configuration"
        );
        Ok(config)
    }
}

fn parse_env<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue { var, value })
}

/// Load this validator's secondary signing key from the environment.
///
/// The key is node-local and never part of the replicated configuration.
pub fn validator_key_from_env() -> Result<SecondarySigningKey, ConfigError> {
    validator_key_from_lookup(|var| std::env::var(var).ok())
}

/// Same as [`validator_key_from_env`] with an injectable lookup.
pub fn validator_key_from_lookup<F>(lookup: F) -> Result<SecondarySigningKey, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(hex_key) = lookup(VALIDATOR_KEY_ENV) else {
        warn!("{} is not set; vote extensions cannot be signed", VALIDATOR_KEY_ENV);
        return Err(ConfigError::MissingValidatorKey);
    };
    SecondarySigningKey::from_hex(hex_key.trim()).map_err(|_| ConfigError::InvalidValidatorKey)
}
