use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("address must not be empty")]
    EmptyAddress,

    #[error("invalid phase tag {tag:?}: {reason}")]
    InvalidPhaseTag { tag: String, reason: &'static str },
}
