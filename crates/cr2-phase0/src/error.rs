use thiserror::Error;

use cr2_crypto::{ChainError, ContextError, KeyError, SeedError, SignatureError};

/// Errors surfaced by participant construction and operation.
#[derive(Debug, Error)]
pub enum ParticipantError {
    #[error("no commitments generated yet")]
    NoCommitments,

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("leader error: {0}")]
    Leader(#[from] LeaderError),
}

pub type ParticipantResult<T> = Result<T, ParticipantError>;

/// Failures delivering a payload to a leader.
///
/// A leader that receives a payload and refuses it answers with
/// [`Verdict::Rejected`](crate::Verdict::Rejected) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("leader unavailable")]
    Unavailable,
}

/// Errors from loading or validating [`Phase0Config`](crate::Phase0Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid chain length {0}: must be at least 1")]
    InvalidChainLength(usize),

    #[error("invalid crypto context: {0}")]
    Context(#[from] ContextError),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
