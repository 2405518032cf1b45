use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of generated seeds.
pub const SEED_LEN: usize = 32;

/// Secret chain seed.
///
/// Owned by exactly one participant and never transmitted. The bytes are
/// wiped when the seed is dropped, and `Debug` output is redacted so the
/// seed cannot leak through logs.
///
/// A `Seed` is never empty. There is no public way to wipe it early; the
/// bytes only go away with the value.
pub struct Seed(Vec<u8>);

impl Seed {
    /// Wrap caller-supplied seed bytes. Empty seeds are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SeedError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SeedError::Empty);
        }
        Ok(Self(bytes))
    }

    /// 32 bytes from the operating system CSPRNG.
    pub fn random() -> Result<Self, SeedError> {
        Self::random_with(&mut OsRng)
    }

    /// 32 bytes from a caller-supplied CSPRNG.
    pub fn random_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, SeedError> {
        let mut bytes = vec![0u8; SEED_LEN];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| SeedError::EntropyUnavailable(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: construction rejects empty seeds.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ZeroizeOnDrop for Seed {}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Errors from seed construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("seed must not be empty")]
    Empty,
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),
}
