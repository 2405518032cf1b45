use cr2_types::Digest;
use tracing::debug;

use crate::hasher::Keccak;
use crate::seed::Seed;

/// Generate a commitment hash chain.
///
/// `v_0 = H(seed)` and `v_i = H(v_{i-1})`. Index 0 is closest to the seed,
/// index `length - 1` is the published commitment. A zero length yields an
/// empty chain; rejecting it is up to the caller.
pub fn generate_chain(seed: &[u8], length: usize) -> Vec<Digest> {
    let mut links = Vec::with_capacity(length);
    if length == 0 {
        return links;
    }
    let mut current = Keccak::hash(seed);
    links.push(current);
    for _ in 1..length {
        current = Keccak::hash(current.as_bytes());
        links.push(current);
    }
    links
}

/// Check a single link: `H(prev) == next`.
pub fn verify_link(prev: &Digest, next: &Digest) -> bool {
    Keccak::hash(prev.as_bytes()) == *next
}

/// Check that hashing `value` exactly `distance` times yields `commitment`.
///
/// A revealed `v_k` opens a published top `v_{N-1}` with
/// `distance = N - 1 - k`.
pub fn verify_opening(value: &Digest, commitment: &Digest, distance: usize) -> bool {
    let mut current = *value;
    for _ in 0..distance {
        current = Keccak::hash(current.as_bytes());
    }
    current == *commitment
}

/// Hash chain integrity verifier.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Verify every link of a chain, reporting the first broken index.
    ///
    /// An empty chain is trivially valid.
    pub fn verify_chain(links: &[Digest]) -> Result<(), ChainError> {
        for (i, pair) in links.windows(2).enumerate() {
            if !verify_link(&pair[0], &pair[1]) {
                return Err(ChainError::BrokenLink { index: i + 1 });
            }
        }
        Ok(())
    }

    /// Verify a chain and that it was generated from `seed`.
    pub fn verify_from_seed(seed: &[u8], links: &[Digest]) -> Result<(), ChainError> {
        match links.first() {
            None => Ok(()),
            Some(first) if Keccak::hash(seed) != *first => Err(ChainError::SeedMismatch),
            Some(_) => Self::verify_chain(links),
        }
    }
}

/// A generated, non-empty commitment chain.
///
/// Immutable once built. Regenerating from the same seed and length yields an
/// identical chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentChain {
    links: Vec<Digest>,
}

impl CommitmentChain {
    /// Generate a chain of `length` links from `seed`. Zero is rejected.
    pub fn generate(seed: &Seed, length: usize) -> Result<Self, ChainError> {
        if length == 0 {
            return Err(ChainError::ZeroLength);
        }
        if seed.is_empty() {
            return Err(ChainError::EmptySeed);
        }
        let links = generate_chain(seed.as_bytes(), length);
        let chain = Self { links };
        debug!(
            length,
            commitment = %chain.commitment().short_hex(),
            "generated commitment chain"
        );
        Ok(chain)
    }

    /// The published commitment, `v_{N-1}`.
    pub fn commitment(&self) -> Digest {
        // `generate` never builds an empty chain.
        self.links[self.links.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<Digest> {
        self.links.get(index).copied()
    }

    /// Link `k` and its hash distance to the commitment, for a later reveal.
    pub fn opening(&self, index: usize) -> Option<(Digest, usize)> {
        let value = self.get(index)?;
        Some((value, self.links.len() - 1 - index))
    }

    /// All links in generation order.
    pub fn links(&self) -> &[Digest] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always `false`: a `CommitmentChain` has at least one link.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Errors from chain generation and verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain length must be at least 1")]
    ZeroLength,

    #[error("seed must not be empty")]
    EmptySeed,

    #[error("broken link at index {index}: hash of previous link does not match")]
    BrokenLink { index: usize },

    #[error("first link is not the hash of the seed")]
    SeedMismatch,
}
