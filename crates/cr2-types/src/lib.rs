//! Foundation types for Commit-Reveal2.
//!
//! Every other `cr2-*` crate depends on `cr2-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — 32-byte Keccak-256 output (chain links, commitments, Merkle nodes)
//! - [`Address`] — Participant identity derived from a public key
//! - [`PhaseTag`] — Protocol phase a signature is scoped to

pub mod address;
pub mod digest;
pub mod error;
pub mod phase;

pub use address::Address;
pub use digest::{Digest, DIGEST_LEN};
pub use error::TypeError;
pub use phase::PhaseTag;
