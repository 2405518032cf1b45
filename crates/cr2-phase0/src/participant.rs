use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use cr2_crypto::{CommitmentChain, CryptoContext, Seed, Signature, SigningKey, VerifyingKey};
use cr2_types::{Address, Digest, PhaseTag};

use crate::error::{ParticipantError, ParticipantResult};
use crate::leader::{LeaderChannel, Verdict};
use crate::payload::{signed_message, SignedPayload};

/// A protocol participant for one round.
///
/// Owns the secret seed and signing key; neither is ever exposed. The
/// address is derived once from the verifying key under the context the
/// participant was built with.
pub struct Participant {
    name: String,
    ctx: CryptoContext,
    seed: Seed,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    address: Address,
    chain: Option<CommitmentChain>,
}

impl Participant {
    /// Create a participant with a fresh random seed and keypair.
    pub fn new(name: impl Into<String>, ctx: &CryptoContext) -> ParticipantResult<Self> {
        let seed = Seed::random()?;
        Self::with_rng(name, seed, ctx, &mut OsRng)
    }

    /// Create a participant from a caller-supplied seed and a fresh keypair.
    pub fn from_seed(
        name: impl Into<String>,
        seed: Seed,
        ctx: &CryptoContext,
    ) -> ParticipantResult<Self> {
        Self::with_rng(name, seed, ctx, &mut OsRng)
    }

    /// Create a participant, drawing the keypair from `rng`.
    pub fn with_rng<R: RngCore + CryptoRng>(
        name: impl Into<String>,
        seed: Seed,
        ctx: &CryptoContext,
        rng: &mut R,
    ) -> ParticipantResult<Self> {
        let name = name.into();
        let (signing_key, verifying_key) = ctx.generate_keypair_with(rng)?;
        let address = ctx.derive_address(&verifying_key);
        info!(name = %name, address = %address, "participant created");
        Ok(Self {
            name,
            ctx: *ctx,
            seed,
            signing_key,
            verifying_key,
            address,
            chain: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.verifying_key
    }

    pub fn context(&self) -> &CryptoContext {
        &self.ctx
    }

    /// The current chain, if one has been generated.
    pub fn chain(&self) -> Option<&CommitmentChain> {
        self.chain.as_ref()
    }

    /// The published commitment `v_{N-1}` of the current chain.
    pub fn commitment(&self) -> Option<Digest> {
        self.chain.as_ref().map(CommitmentChain::commitment)
    }

    /// Generate and store a chain of `length` links, replacing any previous one.
    ///
    /// A zero length fails with
    /// [`ChainError::ZeroLength`](cr2_crypto::ChainError::ZeroLength) and
    /// leaves the current chain in place.
    pub fn generate_commitments(&mut self, length: usize) -> ParticipantResult<&CommitmentChain> {
        let chain = CommitmentChain::generate(&self.seed, length)?;
        info!(
            name = %self.name,
            length,
            commitment = %chain.commitment().short_hex(),
            "commitments generated"
        );
        Ok(self.chain.insert(chain))
    }

    /// Replace the seed and discard the current chain.
    ///
    /// The old seed is zeroized when it drops here.
    pub fn reseed(&mut self, seed: Seed) {
        self.seed = seed;
        self.chain = None;
        debug!(name = %self.name, "participant reseeded");
    }

    /// Sign `data || utf8(phase)` with this participant's key.
    pub fn sign_data(&self, data: &[u8], phase: &PhaseTag) -> ParticipantResult<Signature> {
        Ok(self.signing_key.sign(&signed_message(data, phase))?)
    }

    /// Sign `data` for `phase` and package it for the leader.
    pub fn send_to_leader(&self, data: &[u8], phase: &PhaseTag) -> ParticipantResult<SignedPayload> {
        let signature = self.sign_data(data, phase)?;
        debug!(
            name = %self.name,
            phase = %phase,
            bytes = data.len(),
            "signed payload for leader"
        );
        Ok(SignedPayload {
            sender: self.address.clone(),
            phase: phase.clone(),
            data: data.to_vec(),
            signature,
        })
    }

    /// Sign the current commitment for `phase` and deliver it to `leader`.
    pub fn submit_commitment<L: LeaderChannel + ?Sized>(
        &self,
        leader: &mut L,
        phase: &PhaseTag,
    ) -> ParticipantResult<Verdict> {
        let commitment = self.commitment().ok_or(ParticipantError::NoCommitments)?;
        let payload = self.send_to_leader(commitment.as_bytes(), phase)?;
        let verdict = leader.deliver(payload)?;
        info!(name = %self.name, %verdict, "commitment submitted");
        Ok(verdict)
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("chain_length", &self.chain.as_ref().map(CommitmentChain::len))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeaderError;
    use cr2_crypto::{verify, ChainError, Keccak};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed(name: &str, seed: &[u8]) -> Participant {
        Participant::with_rng(
            name,
            Seed::new(seed).unwrap(),
            &CryptoContext::STANDARD,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    struct Recording {
        payloads: Vec<SignedPayload>,
    }

    impl LeaderChannel for Recording {
        fn deliver(&mut self, payload: SignedPayload) -> Result<Verdict, LeaderError> {
            self.payloads.push(payload);
            Ok(Verdict::Accepted)
        }
    }

    struct Offline;

    impl LeaderChannel for Offline {
        fn deliver(&mut self, _payload: SignedPayload) -> Result<Verdict, LeaderError> {
            Err(LeaderError::Unavailable)
        }
    }

    #[test]
    fn new_participant_has_address() {
        let p = Participant::new("alice", &CryptoContext::STANDARD).unwrap();
        assert_eq!(p.name(), "alice");
        assert_eq!(p.address().len(), 20);
        assert_eq!(p.address().to_hex().len(), 40);
        assert!(p.chain().is_none());
    }

    #[test]
    fn address_matches_context_derivation() {
        let p = fixed("alice", b"seed");
        assert_eq!(
            *p.address(),
            CryptoContext::STANDARD.derive_address(&p.verifying_key())
        );
    }

    #[test]
    fn custom_address_length() {
        let ctx = CryptoContext::new(8).unwrap();
        let p = Participant::new("short", &ctx).unwrap();
        assert_eq!(p.address().len(), 8);
        assert_eq!(p.context().address_len(), 8);
    }

    #[test]
    fn distinct_participants_distinct_addresses() {
        let a = Participant::new("a", &CryptoContext::STANDARD).unwrap();
        let b = Participant::new("b", &CryptoContext::STANDARD).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn generate_commitments_from_seed() {
        let mut p = fixed("alice", b"participant_1_seed");
        let chain = p.generate_commitments(5).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.get(0), Some(Keccak::hash(b"participant_1_seed")));
        assert_eq!(p.commitment(), p.chain().map(|c| c.links()[4]));
    }

    #[test]
    fn zero_length_rejected() {
        let mut p = fixed("alice", b"seed");
        assert!(matches!(
            p.generate_commitments(0),
            Err(ParticipantError::Chain(ChainError::ZeroLength))
        ));
        assert!(p.chain().is_none());
    }

    #[test]
    fn zero_length_keeps_previous_chain() {
        let mut p = fixed("alice", b"seed");
        let before = p.generate_commitments(3).unwrap().commitment();
        assert!(p.generate_commitments(0).is_err());
        assert_eq!(p.commitment(), Some(before));
    }

    #[test]
    fn supplied_seed_drives_the_chain() {
        let mut p = fixed("alice", b"x");
        let commitment = p.generate_commitments(1).unwrap().commitment();
        assert_eq!(commitment, Keccak::hash(b"x"));
        assert_ne!(commitment, Keccak::hash(b""));
    }

    fn assert_send<T: Send>() {}

    #[test]
    fn participant_and_leader_are_send() {
        assert_send::<Participant>();
        assert_send::<crate::InMemoryLeader>();
        assert_send::<Box<dyn LeaderChannel>>();
    }

    #[test]
    fn regenerate_replaces_chain() {
        let mut p = fixed("alice", b"seed");
        p.generate_commitments(3).unwrap();
        p.generate_commitments(6).unwrap();
        assert_eq!(p.chain().map(CommitmentChain::len), Some(6));
    }

    #[test]
    fn same_seed_same_chain() {
        let mut a = fixed("a", b"shared");
        let mut b = fixed("b", b"shared");
        let ca = a.generate_commitments(4).unwrap().clone();
        let cb = b.generate_commitments(4).unwrap().clone();
        assert_eq!(ca, cb);
    }

    #[test]
    fn reseed_discards_chain() {
        let mut p = fixed("alice", b"old");
        let old = p.generate_commitments(2).unwrap().commitment();
        p.reseed(Seed::new(b"new".to_vec()).unwrap());
        assert!(p.chain().is_none());
        let new = p.generate_commitments(2).unwrap().commitment();
        assert_ne!(old, new);
    }

    #[test]
    fn send_to_leader_signs_data_and_tag() {
        let p = fixed("alice", b"seed");
        let payload = p.send_to_leader(b"example data", &PhaseTag::COMMIT).unwrap();
        assert_eq!(payload.data, b"example data");
        assert_eq!(payload.sender, *p.address());
        assert!(verify(
            &p.verifying_key(),
            b"example dataphase0",
            &payload.signature.to_bytes()
        ));
        assert!(!verify(
            &p.verifying_key(),
            b"example data",
            &payload.signature.to_bytes()
        ));
    }

    #[test]
    fn send_to_leader_accepts_empty_data() {
        let p = fixed("alice", b"seed");
        let payload = p.send_to_leader(b"", &PhaseTag::COMMIT).unwrap();
        assert!(payload.verify(&p.verifying_key()));
    }

    #[test]
    fn submit_without_chain_fails() {
        let p = fixed("alice", b"seed");
        let mut leader = Recording { payloads: vec![] };
        assert!(matches!(
            p.submit_commitment(&mut leader, &PhaseTag::COMMIT),
            Err(ParticipantError::NoCommitments)
        ));
        assert!(leader.payloads.is_empty());
    }

    #[test]
    fn submit_delivers_signed_commitment() {
        let mut p = fixed("alice", b"seed");
        p.generate_commitments(3).unwrap();
        let mut leader = Recording { payloads: vec![] };
        let verdict = p.submit_commitment(&mut leader, &PhaseTag::COMMIT).unwrap();
        assert!(verdict.is_accepted());

        let delivered = &leader.payloads[0];
        assert_eq!(delivered.data, p.commitment().unwrap().as_bytes().to_vec());
        assert!(delivered.verify(&p.verifying_key()));
    }

    #[test]
    fn submit_through_trait_object() {
        let mut p = fixed("alice", b"seed");
        p.generate_commitments(1).unwrap();
        let mut leader: Box<dyn LeaderChannel> = Box::new(Recording { payloads: vec![] });
        assert!(p
            .submit_commitment(leader.as_mut(), &PhaseTag::COMMIT)
            .unwrap()
            .is_accepted());
    }

    #[test]
    fn delivery_failure_surfaces_as_error() {
        let mut p = fixed("alice", b"seed");
        p.generate_commitments(2).unwrap();
        assert!(matches!(
            p.submit_commitment(&mut Offline, &PhaseTag::COMMIT),
            Err(ParticipantError::Leader(LeaderError::Unavailable))
        ));
    }

    #[test]
    fn debug_hides_secrets() {
        let p = fixed("alice", b"very secret seed");
        let dbg = format!("{p:?}");
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("very secret seed"));
        assert!(!dbg.contains("seed:"));
    }
}
