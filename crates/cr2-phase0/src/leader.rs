use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cr2_crypto::{CryptoContext, MerkleProof, MerkleTree, Signature, VerifyingKey};
use cr2_types::{Address, Digest, PhaseTag, DIGEST_LEN};

use crate::error::LeaderError;
use crate::payload::SignedPayload;

/// Capability to hand signed payloads to a round leader.
///
/// The in-process [`InMemoryLeader`] implements it today; a network client
/// can implement it later without touching [`Participant`](crate::Participant).
pub trait LeaderChannel: Send {
    /// Deliver one payload.
    ///
    /// `Err` means the payload did not reach the leader. A leader that
    /// received and refused it returns `Ok(Verdict::Rejected { .. })`.
    fn deliver(&mut self, payload: SignedPayload) -> Result<Verdict, LeaderError>;
}

/// Leader decision on a delivered payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected { reason: Rejection },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    fn rejected(reason: Rejection) -> Self {
        Self::Rejected { reason }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected { reason } => write!(f, "Rejected: {reason}"),
        }
    }
}

/// Why a leader refused a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Sender was never registered for this round.
    UnknownSender,
    /// Payload is tagged for a different phase.
    WrongPhase { expected: PhaseTag, actual: PhaseTag },
    /// Commitment data is not a single digest.
    MalformedCommitment { len: usize },
    /// Signature does not verify under the sender's registered key.
    InvalidSignature,
    /// Sender already has an accepted commitment this round.
    DuplicateSubmission,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSender => write!(f, "unknown sender"),
            Self::WrongPhase { expected, actual } => {
                write!(f, "wrong phase: expected {expected}, got {actual}")
            }
            Self::MalformedCommitment { len } => {
                write!(f, "commitment must be {DIGEST_LEN} bytes, got {len}")
            }
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::DuplicateSubmission => write!(f, "duplicate submission"),
        }
    }
}

/// In-process leader collecting commit-phase submissions for one round.
///
/// Participants are registered up front; activation order is registration
/// order. Once every registered participant has an accepted commitment the
/// leader builds a Merkle tree over them in activation order.
pub struct InMemoryLeader {
    ctx: CryptoContext,
    phase: PhaseTag,
    activation_order: Vec<Address>,
    keys: HashMap<Address, VerifyingKey>,
    received: HashMap<Address, (Digest, Signature)>,
    tree: Option<MerkleTree>,
}

impl InMemoryLeader {
    pub fn new(ctx: CryptoContext, phase: PhaseTag) -> Self {
        Self {
            ctx,
            phase,
            activation_order: Vec::new(),
            keys: HashMap::new(),
            received: HashMap::new(),
            tree: None,
        }
    }

    /// Register a participant by public key and return its address.
    ///
    /// Registering the same key twice is a no-op.
    pub fn register(&mut self, key: VerifyingKey) -> Address {
        let address = self.ctx.derive_address(&key);
        if !self.keys.contains_key(&address) {
            self.keys.insert(address.clone(), key);
            self.activation_order.push(address.clone());
            // A new participant means the round is no longer complete.
            self.tree = None;
            info!(participant = %address.short_id(), "participant registered");
        }
        address
    }

    pub fn phase(&self) -> &PhaseTag {
        &self.phase
    }

    pub fn participant_count(&self) -> usize {
        self.activation_order.len()
    }

    pub fn activation_order(&self) -> &[Address] {
        &self.activation_order
    }

    pub fn submission_count(&self) -> usize {
        self.received.len()
    }

    /// Accepted commitment and signature for `address`.
    pub fn submission(&self, address: &Address) -> Option<&(Digest, Signature)> {
        self.received.get(address)
    }

    /// `true` once every registered participant has submitted.
    pub fn is_complete(&self) -> bool {
        !self.activation_order.is_empty() && self.received.len() == self.activation_order.len()
    }

    /// Commitments in activation order, once the round is complete.
    pub fn commitments(&self) -> Option<Vec<Digest>> {
        if !self.is_complete() {
            return None;
        }
        self.activation_order
            .iter()
            .map(|address| self.received.get(address).map(|(digest, _)| *digest))
            .collect()
    }

    /// Merkle root over all commitments, once the round is complete.
    pub fn commitment_root(&self) -> Option<Digest> {
        self.tree.as_ref().map(MerkleTree::root)
    }

    /// Inclusion proof of `address`'s commitment under the root.
    pub fn inclusion_proof(&self, address: &Address) -> Option<MerkleProof> {
        let index = self.activation_order.iter().position(|a| a == address)?;
        self.tree.as_ref()?.proof(index)
    }

    fn check(&self, payload: &SignedPayload) -> Result<Digest, Rejection> {
        let key = self
            .keys
            .get(&payload.sender)
            .ok_or(Rejection::UnknownSender)?;
        if payload.phase != self.phase {
            return Err(Rejection::WrongPhase {
                expected: self.phase.clone(),
                actual: payload.phase.clone(),
            });
        }
        let commitment =
            Digest::from_slice(&payload.data).map_err(|_| Rejection::MalformedCommitment {
                len: payload.data.len(),
            })?;
        if !payload.verify(key) {
            return Err(Rejection::InvalidSignature);
        }
        if self.received.contains_key(&payload.sender) {
            return Err(Rejection::DuplicateSubmission);
        }
        Ok(commitment)
    }

    fn build_tree(&mut self) {
        if let Some(leaves) = self.commitments() {
            let tree = MerkleTree::from_leaves(leaves);
            info!(
                participants = self.activation_order.len(),
                root = %tree.root().short_hex(),
                "all commitments received; built commitment tree"
            );
            self.tree = Some(tree);
        }
    }
}

impl LeaderChannel for InMemoryLeader {
    fn deliver(&mut self, payload: SignedPayload) -> Result<Verdict, LeaderError> {
        let commitment = match self.check(&payload) {
            Ok(commitment) => commitment,
            Err(reason) => {
                warn!(sender = %payload.sender.short_id(), %reason, "rejected submission");
                return Ok(Verdict::rejected(reason));
            }
        };

        debug!(
            sender = %payload.sender.short_id(),
            commitment = %commitment.short_hex(),
            "accepted commitment"
        );
        self.received
            .insert(payload.sender, (commitment, payload.signature));
        if self.is_complete() {
            self.build_tree();
        }
        Ok(Verdict::Accepted)
    }
}
