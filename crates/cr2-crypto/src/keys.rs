use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Candidates drawn before key generation gives up. A healthy CSPRNG hits an
/// invalid scalar with probability below 2^-127 per draw.
const MAX_KEYGEN_ATTEMPTS: usize = 64;

/// secp256k1 signing key (private scalar).
pub struct SigningKey(pub(crate) k256::ecdsa::SigningKey);

/// secp256k1 verifying key (public point).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(pub(crate) k256::ecdsa::VerifyingKey);

impl SigningKey {
    /// Draw a uniformly random scalar in `[1, n)` from `rng`.
    ///
    /// Candidates outside the valid range are rejected and redrawn. An RNG
    /// that fails to produce bytes is fatal.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, KeyError> {
        let mut candidate = Zeroizing::new([0u8; 32]);
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            rng.try_fill_bytes(&mut candidate[..])
                .map_err(|e| KeyError::EntropyUnavailable(e.to_string()))?;
            if let Ok(key) = k256::ecdsa::SigningKey::from_slice(&candidate[..]) {
                return Ok(Self(key));
            }
        }
        Err(KeyError::EntropyUnavailable(
            "random source produced no valid scalar".into(),
        ))
    }

    /// Import a 32-byte big-endian secret scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        k256::ecdsa::SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidSecret)
    }

    /// Export the secret scalar. The buffer is wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.0.to_bytes().into())
    }

    /// The corresponding public key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(*self.0.verifying_key())
    }
}

impl VerifyingKey {
    /// Parse a SEC1-encoded point (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidPublicKey)
    }

    /// Uncompressed SEC1 encoding: `0x04 || x || y`.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let point = self.0.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Compressed SEC1 encoding: `0x02|0x03 || x`.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.0.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.to_compressed()))
    }
}

/// Errors from key generation and import.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),
    #[error("secret is not a valid secp256k1 scalar")]
    InvalidSecret,
    #[error("invalid secp256k1 public key")]
    InvalidPublicKey,
}
