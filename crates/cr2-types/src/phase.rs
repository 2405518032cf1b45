use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Scopes a signature to one protocol phase.
///
/// The tag's bytes are appended to every signed message, so a signature
/// produced for `"phase0"` never verifies for `"phase1"`. Tags are `phase`
/// followed by one or more ASCII digits (at most 32 bytes). No valid tag is a
/// proper suffix of another, so moving bytes between data and tag can never
/// turn one phase's message into another's.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhaseTag(Cow<'static, str>);

impl PhaseTag {
    /// Maximum tag length in bytes.
    pub const MAX_LEN: usize = 32;

    /// Fixed prefix of every tag.
    pub const PREFIX: &'static str = "phase";

    /// The commit phase (phase 0).
    pub const COMMIT: Self = Self(Cow::Borrowed("phase0"));

    /// Validate and build a tag.
    pub fn new(tag: impl Into<String>) -> Result<Self, TypeError> {
        let tag = tag.into();
        Self::check(&tag)?;
        Ok(Self(Cow::Owned(tag)))
    }

    fn check(tag: &str) -> Result<(), TypeError> {
        let reason = if tag.is_empty() {
            "empty"
        } else if tag.len() > Self::MAX_LEN {
            "longer than 32 bytes"
        } else {
            match tag.strip_prefix(Self::PREFIX) {
                None => "must start with \"phase\"",
                Some("") => "missing phase number",
                Some(n) if !n.bytes().all(|b| b.is_ascii_digit()) => {
                    "phase number must be ASCII digits"
                }
                Some(_) => return Ok(()),
            }
        };
        Err(TypeError::InvalidPhaseTag {
            tag: tag.to_string(),
            reason,
        })
    }

    /// Numbered tag, `phase{n}`.
    pub fn numbered(n: u32) -> Self {
        Self(Cow::Owned(format!("{}{n}", Self::PREFIX)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bytes appended to a message before signing.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Default for PhaseTag {
    fn default() -> Self {
        Self::COMMIT
    }
}

impl TryFrom<String> for PhaseTag {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PhaseTag {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhaseTag> for String {
    fn from(tag: PhaseTag) -> Self {
        tag.0.into_owned()
    }
}

impl fmt::Debug for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhaseTag({})", self.0)
    }
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
