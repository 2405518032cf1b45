//! Cryptographic primitives for Commit-Reveal2.
//!
//! Provides Keccak-256 hashing, secp256k1 key material with address
//! derivation, recoverable ECDSA signatures, secret seeds, commitment hash
//! chains, and a Keccak Merkle tree over commitments.
//!
//! All crypto operations wrap established libraries (`sha3`, `k256`); there
//! is no custom cryptography here.

pub mod chain;
pub mod context;
pub mod hasher;
pub mod keys;
pub mod merkle;
pub mod seed;
pub mod signer;

pub use chain::{
    generate_chain, verify_link, verify_opening, ChainError, ChainVerifier, CommitmentChain,
};
pub use context::{ContextError, CryptoContext, Curve};
pub use hasher::Keccak;
pub use keys::{KeyError, SigningKey, VerifyingKey};
pub use merkle::{MerkleProof, MerkleTree, Side};
pub use seed::{Seed, SeedError};
pub use signer::{verify, Signature, SignatureError, SIGNATURE_LEN};
