use cr2_types::Digest;
use sha3::{Digest as _, Keccak256};

/// Keccak-256 hasher.
///
/// This is the original Keccak submission (pad byte `0x01`), as used by
/// Ethereum, and not NIST SHA3-256 (pad byte `0x06`). The two produce
/// different digests for every input.
///
/// No domain separation is applied: commitment chains must be recomputable
/// by any Keccak-256 implementation.
pub struct Keccak;

impl Keccak {
    /// Hash raw bytes.
    pub fn hash(data: &[u8]) -> Digest {
        Digest::from_hash(Keccak256::digest(data).into())
    }

    /// Hash the concatenation of `parts` without building it in memory.
    pub fn hash_parts(parts: &[&[u8]]) -> Digest {
        let mut hasher = Keccak256::new();
        for part in parts {
            hasher.update(part);
        }
        Digest::from_hash(hasher.finalize().into())
    }

    /// Verify that `data` hashes to `expected`.
    pub fn verify(data: &[u8], expected: &Digest) -> bool {
        Self::hash(data) == *expected
    }
}
