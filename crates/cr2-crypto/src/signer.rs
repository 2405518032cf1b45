use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::RecoveryId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hasher::Keccak;
use crate::keys::{SigningKey, VerifyingKey};

/// Encoded signature length: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LEN: usize = 65;

/// Recoverable secp256k1 ECDSA signature over the Keccak-256 of a message.
///
/// `s` is always in the lower half of the curve order and `v` is the
/// recovery id (0 or 1), so the encoding matches what Ethereum tooling
/// expects from `eth_sign`-style signers minus the `+27` offset.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_serde")] [u8; SIGNATURE_LEN]);

impl SigningKey {
    /// Sign `message`.
    ///
    /// The message is hashed with Keccak-256 first and the nonce is derived
    /// per RFC 6979, so signing is deterministic for a given key and message.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, SignatureError> {
        let prehash = Keccak::hash(message);
        let (sig, recovery_id) = self
            .0
            .sign_prehash_recoverable(prehash.as_bytes())
            .map_err(|_| SignatureError::SigningFailed)?;
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recovery_id.to_byte();
        debug!(prehash = %prehash.short_hex(), "message signed");
        Ok(Signature(out))
    }
}

impl VerifyingKey {
    /// Check `signature` over `message` against this key.
    ///
    /// Returns `false` for any mismatch. The recovery byte is checked too: a
    /// signature whose `v` does not recover this key is rejected even if
    /// `(r, s)` alone would verify.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Some((sig, recovery_id)) = signature.parts() else {
            return false;
        };
        let prehash = Keccak::hash(message);
        if self.0.verify_prehash(prehash.as_bytes(), &sig).is_err() {
            return false;
        }
        k256::ecdsa::VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recovery_id)
            .map(|recovered| recovered == self.0)
            .unwrap_or(false)
    }
}

/// Verify raw signature bytes. Malformed or wrong-length input yields `false`.
pub fn verify(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
    Signature::from_slice(signature)
        .map(|sig| key.verify(message, &sig))
        .unwrap_or(false)
}

impl Signature {
    /// Parse a 65-byte `r || s || v` encoding.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let arr: [u8; SIGNATURE_LEN] =
            bytes
                .try_into()
                .map_err(|_| SignatureError::InvalidLength {
                    expected: SIGNATURE_LEN,
                    actual: bytes.len(),
                })?;
        let sig = Self(arr);
        if sig.parts().is_none() {
            return Err(SignatureError::Malformed);
        }
        Ok(sig)
    }

    /// The 65-byte encoding.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0
    }

    /// The recovery id byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Recover the public key that produced this signature over `message`.
    pub fn recover(&self, message: &[u8]) -> Option<VerifyingKey> {
        let (sig, recovery_id) = self.parts()?;
        let prehash = Keccak::hash(message);
        k256::ecdsa::VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recovery_id)
            .ok()
            .map(VerifyingKey)
    }

    fn parts(&self) -> Option<(k256::ecdsa::Signature, RecoveryId)> {
        let sig = k256::ecdsa::Signature::from_slice(&self.0[..64]).ok()?;
        let recovery_id = RecoveryId::from_byte(self.0[64])?;
        Some((sig, recovery_id))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0[..8]))
    }
}

/// Errors from signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing failed")]
    SigningFailed,
    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("malformed signature")]
    Malformed,
}

mod signature_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::{Signature, SIGNATURE_LEN};

    pub fn serialize<S>(sig: &[u8; SIGNATURE_LEN], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(sig))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; SIGNATURE_LEN], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        Signature::from_slice(&bytes)
            .map(|sig| sig.to_bytes())
            .map_err(serde::de::Error::custom)
    }
}
