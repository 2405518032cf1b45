use serde::{Deserialize, Serialize};

use cr2_crypto::{CryptoContext, Signature, VerifyingKey};
use cr2_types::{Address, PhaseTag};

/// Canonical signed message: `data || utf8(phase_tag)`.
///
/// No length prefix or separator is inserted. Leaders rebuild the message
/// from the payload fields. Since no valid [`PhaseTag`] is a proper suffix of
/// another, a message has at most one split into data and a valid tag.
pub fn signed_message(data: &[u8], phase: &PhaseTag) -> Vec<u8> {
    let mut message = Vec::with_capacity(data.len() + phase.as_bytes().len());
    message.extend_from_slice(data);
    message.extend_from_slice(phase.as_bytes());
    message
}

/// Data authenticated by a participant for one protocol phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub sender: Address,
    pub phase: PhaseTag,
    pub data: Vec<u8>,
    pub signature: Signature,
}

impl SignedPayload {
    /// Check the signature against the sender's known public key.
    pub fn verify(&self, key: &VerifyingKey) -> bool {
        key.verify(&signed_message(&self.data, &self.phase), &self.signature)
    }

    /// Recover the signer's address from the signature alone.
    ///
    /// Returns `None` if no key can be recovered. A leader compares the
    /// result with `sender` to authenticate without a key registry.
    pub fn recover_sender(&self, ctx: &CryptoContext) -> Option<Address> {
        ctx.recover_address(&signed_message(&self.data, &self.phase), &self.signature)
    }

    /// The `(data, signature)` pair handed to the leader.
    pub fn into_parts(self) -> (Vec<u8>, Signature) {
        (self.data, self.signature)
    }
}
