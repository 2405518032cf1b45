use cr2_types::{Address, DIGEST_LEN};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::hasher::Keccak;
use crate::keys::{KeyError, SigningKey, VerifyingKey};
use crate::signer::Signature;

/// Elliptic curve used for identities and signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    Secp256k1,
}

impl Curve {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
        }
    }
}

/// Process-wide cryptographic parameters.
///
/// Built once at startup (usually [`CryptoContext::STANDARD`]) and passed by
/// reference into key generation and address derivation. Tests construct
/// their own contexts instead of mutating shared state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CryptoContext {
    curve: Curve,
    address_len: usize,
}

impl CryptoContext {
    /// secp256k1 with 20-byte addresses (Ethereum layout).
    pub const STANDARD: Self = Self {
        curve: Curve::Secp256k1,
        address_len: 20,
    };

    /// A secp256k1 context with a custom address length (1 to 32 bytes).
    pub fn new(address_len: usize) -> Result<Self, ContextError> {
        if address_len == 0 || address_len > DIGEST_LEN {
            return Err(ContextError::InvalidAddressLength(address_len));
        }
        Ok(Self {
            curve: Curve::Secp256k1,
            address_len,
        })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn address_len(&self) -> usize {
        self.address_len
    }

    /// Generate a keypair from the operating system CSPRNG.
    pub fn generate_keypair(&self) -> Result<(SigningKey, VerifyingKey), KeyError> {
        self.generate_keypair_with(&mut OsRng)
    }

    /// Generate a keypair from a caller-supplied CSPRNG.
    pub fn generate_keypair_with<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(SigningKey, VerifyingKey), KeyError> {
        let signing_key = SigningKey::generate(rng)?;
        let verifying_key = signing_key.verifying_key();
        Ok((signing_key, verifying_key))
    }

    /// Derive the participant address for a public key.
    ///
    /// Hashes the 64-byte `x || y` body of the uncompressed SEC1 encoding
    /// (the `0x04` tag is skipped) and keeps the last `address_len` bytes.
    pub fn derive_address(&self, key: &VerifyingKey) -> Address {
        let point = key.to_uncompressed();
        let hash = Keccak::hash(&point[1..]);
        Address::from_raw(&hash.as_bytes()[DIGEST_LEN - self.address_len..])
    }

    /// Address of whoever signed `message`, or `None` if no key recovers.
    pub fn recover_address(&self, message: &[u8], signature: &Signature) -> Option<Address> {
        signature
            .recover(message)
            .map(|key| self.derive_address(&key))
    }
}

impl Default for CryptoContext {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Errors from building a [`CryptoContext`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("address length must be between 1 and 32 bytes, got {0}")]
    InvalidAddressLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_context() {
        let ctx = CryptoContext::default();
        assert_eq!(ctx, CryptoContext::STANDARD);
        assert_eq!(ctx.address_len(), 20);
        assert_eq!(ctx.curve().name(), "secp256k1");
    }

    #[test]
    fn address_length_bounds() {
        assert_eq!(
            CryptoContext::new(0).unwrap_err(),
            ContextError::InvalidAddressLength(0)
        );
        assert!(CryptoContext::new(33).is_err());
        assert!(CryptoContext::new(1).is_ok());
        assert!(CryptoContext::new(32).is_ok());
    }

    #[test]
    fn ethereum_address_for_private_key_one() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let sk = SigningKey::from_bytes(&secret).unwrap();
        let addr = CryptoContext::STANDARD.derive_address(&sk.verifying_key());
        assert_eq!(addr.to_string(), "7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn address_is_stable() {
        let (_, vk) = CryptoContext::STANDARD.generate_keypair().unwrap();
        let a1 = CryptoContext::STANDARD.derive_address(&vk);
        let a2 = CryptoContext::STANDARD.derive_address(&vk);
        assert_eq!(a1, a2);
        assert_eq!(a1.len(), 20);
        assert_eq!(a1.to_string(), a1.to_string().to_lowercase());
    }

    #[test]
    fn distinct_keys_distinct_addresses() {
        let ctx = CryptoContext::STANDARD;
        let (_, vk1) = ctx.generate_keypair().unwrap();
        let (_, vk2) = ctx.generate_keypair().unwrap();
        assert_ne!(ctx.derive_address(&vk1), ctx.derive_address(&vk2));
    }

    #[test]
    fn custom_length_is_suffix_of_full_hash() {
        let (_, vk) = CryptoContext::STANDARD.generate_keypair().unwrap();
        let full = CryptoContext::new(32).unwrap().derive_address(&vk);
        let short = CryptoContext::STANDARD.derive_address(&vk);
        assert_eq!(full.as_bytes()[12..], *short.as_bytes());
    }

    #[test]
    fn recovered_address_matches_signer() {
        let ctx = CryptoContext::STANDARD;
        let (sk, vk) = ctx.generate_keypair().unwrap();
        let sig = sk.sign(b"commitment").unwrap();
        assert_eq!(ctx.recover_address(b"commitment", &sig), Some(ctx.derive_address(&vk)));
        assert_ne!(ctx.recover_address(b"other", &sig), Some(ctx.derive_address(&vk)));
    }
}
