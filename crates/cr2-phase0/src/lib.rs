//! Commit-Reveal2 phase 0.
//!
//! Participants generate a commitment hash chain from a secret seed, sign the
//! chain's top value under the commit phase tag, and hand it to a round
//! leader through [`LeaderChannel`]. [`InMemoryLeader`] is the in-process
//! leader used by tests and the demo.

pub mod config;
pub mod error;
pub mod leader;
pub mod participant;
pub mod payload;

pub use config::Phase0Config;
pub use error::{ConfigError, LeaderError, ParticipantError, ParticipantResult};
pub use leader::{InMemoryLeader, LeaderChannel, Rejection, Verdict};
pub use participant::Participant;
pub use payload::{signed_message, SignedPayload};

// Re-export the types callers need to drive a round
pub use cr2_crypto::{CommitmentChain, CryptoContext, Seed, Signature, VerifyingKey};
pub use cr2_types::{Address, Digest, PhaseTag};
