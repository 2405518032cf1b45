use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Stable participant identity.
///
/// An `Address` is a non-empty suffix of the Keccak-256 hash of a
/// participant's uncompressed public key (20 bytes under the standard
/// context, the same layout Ethereum uses). The derivation itself lives in
/// `cr2-crypto`; this type only stores and formats the bytes.
///
/// Leaders key their participant bookkeeping by `Address`, so it is `Ord`
/// and `Hash`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    bytes: Vec<u8>,
}

impl Address {
    /// Wrap already-derived address bytes.
    pub fn from_raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Address length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-length address.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Short identifier (`0x` plus the first 8 hex characters).
    pub fn short_id(&self) -> String {
        let n = self.bytes.len().min(4);
        format!("0x{}", hex::encode(&self.bytes[..n]))
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.is_empty() {
            return Err(TypeError::EmptyAddress);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short_id())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_hex() {
        let addr = Address::from_raw(vec![0xAB, 0xCD, 0xEF]);
        assert_eq!(addr.to_string(), "abcdef");
    }

    #[test]
    fn short_id_format() {
        let addr = Address::from_raw([0x11u8; 20]);
        let short = addr.short_id();
        assert_eq!(short, "0x11111111");
        assert_eq!(short.len(), 10);
    }

    #[test]
    fn short_id_of_tiny_address() {
        let addr = Address::from_raw(vec![0x01, 0x02]);
        assert_eq!(addr.short_id(), "0x0102");
    }

    #[test]
    fn hex_roundtrip() {
        let addr = Address::from_raw([0x5au8; 20]);
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let addr = Address::from_raw([0x3cu8; 20]);
        let parsed = Address::from_hex(&format!("0x{addr}")).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn empty_hex_rejected() {
        assert_eq!(Address::from_hex("0x").unwrap_err(), TypeError::EmptyAddress);
        assert_eq!(Address::from_hex("").unwrap_err(), TypeError::EmptyAddress);
    }

    #[test]
    fn any_nonempty_length_parses() {
        assert_eq!(Address::from_hex("ab").unwrap().len(), 1);
        assert_eq!(Address::from_hex(&"cd".repeat(32)).unwrap().len(), 32);
    }

    #[test]
    fn ordering_is_bytewise() {
        let a = Address::from_raw([0u8; 20]);
        let b = Address::from_raw([1u8; 20]);
        assert!(a < b);
    }

    #[test]
    fn serde_roundtrip() {
        let addr = Address::from_raw([9u8; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, parsed);
    }
}
