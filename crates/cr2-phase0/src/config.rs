use serde::{Deserialize, Serialize};

use cr2_crypto::CryptoContext;
use cr2_types::PhaseTag;

use crate::error::ConfigError;

/// Round parameters agreed out-of-band by all participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase0Config {
    /// Number of links in each participant's commitment chain.
    pub chain_length: usize,
    /// Tag every commit-phase signature is scoped to.
    pub phase_tag: PhaseTag,
    /// Bytes of the public-key hash kept as the participant address.
    pub address_len: usize,
}

impl Default for Phase0Config {
    /// Two links (`co = H(s)`, `cv = H(co)`), tagged `phase0`, 20-byte addresses.
    fn default() -> Self {
        Self {
            chain_length: 2,
            phase_tag: PhaseTag::COMMIT,
            address_len: CryptoContext::STANDARD.address_len(),
        }
    }
}

impl Phase0Config {
    /// Parse a TOML document and validate it. Missing keys take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_length == 0 {
            return Err(ConfigError::InvalidChainLength(self.chain_length));
        }
        CryptoContext::new(self.address_len)?;
        Ok(())
    }

    /// Build the crypto context these parameters describe.
    pub fn crypto_context(&self) -> Result<CryptoContext, ConfigError> {
        Ok(CryptoContext::new(self.address_len)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = Phase0Config::default();
        assert_eq!(c.chain_length, 2);
        assert_eq!(c.phase_tag, PhaseTag::COMMIT);
        assert_eq!(c.address_len, 20);
        assert!(c.validate().is_ok());
        assert_eq!(c.crypto_context().unwrap(), CryptoContext::STANDARD);
    }

    #[test]
    fn zero_chain_length_rejected() {
        let c = Phase0Config {
            chain_length: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidChainLength(0))));
    }

    #[test]
    fn bad_address_length_rejected() {
        let c = Phase0Config {
            address_len: 40,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Context(_))));
    }

    #[test]
    fn toml_with_overrides() {
        let c = Phase0Config::from_toml_str(
            r#"
            chain_length = 16
            phase_tag = "phase2"
            "#,
        )
        .unwrap();
        assert_eq!(c.chain_length, 16);
        assert_eq!(c.phase_tag.as_str(), "phase2");
        assert_eq!(c.address_len, 20);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Phase0Config::from_toml_str("").unwrap(), Phase0Config::default());
    }

    #[test]
    fn toml_with_invalid_tag_rejected() {
        let err = Phase0Config::from_toml_str(r#"phase_tag = "has space""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = Phase0Config::from_toml_str(r#"phase_tag = "0""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_with_zero_length_rejected() {
        let err = Phase0Config::from_toml_str("chain_length = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChainLength(0)));
    }

    #[test]
    fn serde_roundtrip() {
        let c = Phase0Config {
            chain_length: 5,
            ..Default::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let parsed: Phase0Config = serde_json::from_str(&json).unwrap();
        assert_eq!(c, parsed);
    }
}
