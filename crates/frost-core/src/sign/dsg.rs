//! Sign round 1 (nonce commit) and round 2 (binding factor, challenge,
//! share emit, aggregate-and-verify), grounded on the teacher's
//! `sign::dsg::{pre_signature, create_partial_signature,
//! combine_partial_signatures, compute_lagrange_coefficient}` shape,
//! replacing its ECDSA/MtA presignature with FROST's additive nonce
//! binding (no counterpart in the teacher, cross-checked against the Go
//! original's `pkg/frost/sign/{party,round2}.go`).

use crate::codec::Frame;
use crate::driver::{NextRound, Round};
use crate::error::{Error, Result};
use crate::output::SignOutput;
use crate::party::{PartyId, PartySet};
use crate::polynomial::lagrange_coefficient;
use curve25519_dalek::{EdwardsPoint, Scalar};
use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};
use std::collections::BTreeMap;
use zeroize::Zeroize;

/// Round 1: sample fresh per-session nonces, broadcast their commitments,
/// and collect every signer's.
pub struct SignRound1 {
    self_id: PartyId,
    signers: PartySet,
    message: Vec<u8>,
    group_public_key: EdwardsPoint,
    public_shares: BTreeMap<u16, EdwardsPoint>,
    secret_share: Scalar,
    d: Scalar,
    e: Scalar,
    received: BTreeMap<u16, (EdwardsPoint, EdwardsPoint)>,
}

impl SignRound1 {
    /// Start a fresh sign session over `message` with the given signer set
    /// `S` (must contain `self_id`) and the group public data from keygen.
    pub fn new(
        self_id: PartyId,
        signers: PartySet,
        secret_share: Scalar,
        group_public_key: EdwardsPoint,
        public_shares: BTreeMap<u16, EdwardsPoint>,
        message: Vec<u8>,
    ) -> Result<Self> {
        if !signers.contains(self_id) {
            return Err(Error::InvalidParty(format!(
                "self id {self_id} is not a member of the signer set"
            )));
        }

        let d = nonzero_scalar();
        let e = nonzero_scalar();
        let mut received = BTreeMap::new();
        received.insert(self_id.get(), (basepoint() * d, basepoint() * e));

        Ok(Self {
            self_id,
            signers,
            message,
            group_public_key,
            public_shares,
            secret_share,
            d,
            e,
            received,
        })
    }
}

#[async_trait::async_trait]
impl Round for SignRound1 {
    type Output = SignOutput;

    fn on_enter(&mut self) -> Result<Vec<Frame>> {
        let &(d_point, e_point) = &self.received[&self.self_id.get()];
        Ok(vec![Frame::Sign1 {
            from: self.self_id,
            d: d_point,
            e: e_point,
        }])
    }

    fn store_message(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::Sign1 { from, d, e } => {
                if !self.signers.contains(from) {
                    return Err(Error::UnknownSender { party_id: from.get() });
                }
                match self.received.get(&from.get()) {
                    Some(&(ed, ee)) if ed == d && ee == e => Ok(()),
                    Some(_) => Err(Error::DuplicateSender { party_id: from.get() }),
                    None => {
                        self.received.insert(from.get(), (d, e));
                        Ok(())
                    }
                }
            }
            Frame::Sign2 { from, .. } => Err(Error::WrongRound { party_id: from.get() }),
            other => Err(Error::WrongType { party_id: other.from().get() }),
        }
    }

    fn is_ready(&self) -> bool {
        self.received.len() == self.signers.len()
    }

    async fn process_messages(&mut self) -> Result<()> {
        Ok(())
    }

    fn generate_messages(&mut self) -> Result<Vec<Frame>> {
        Ok(vec![])
    }

    fn next_round(self: Box<Self>) -> Result<NextRound<SignOutput>> {
        let SignRound1 {
            self_id,
            signers,
            message,
            group_public_key,
            public_shares,
            secret_share,
            mut d,
            mut e,
            received,
        } = *self;

        let signer_ids: Vec<PartyId> = signers.iter().collect();
        let binding = canonical_binding(&signer_ids, &received);

        let mut r_per_party = BTreeMap::new();
        let mut r_total = EdwardsPoint::default();
        for &k in &signer_ids {
            let rho_k = binding_factor(k, &message, &binding);
            let &(dk, ek) = &received[&k.get()];
            let r_k = dk + ek * rho_k;
            r_per_party.insert(k.get(), r_k);
            r_total += r_k;
        }

        let challenge = ed25519_challenge(r_total, group_public_key, &message);

        let rho_i = binding_factor(self_id, &message, &binding);
        let lambda_i = lagrange_coefficient(self_id, &signer_ids)?;
        let own_z = d + e * rho_i + challenge * lambda_i * secret_share;
        d.zeroize();
        e.zeroize();

        let mut shares = BTreeMap::new();
        shares.insert(self_id.get(), own_z);

        Ok(NextRound::Round(Box::new(SignRound2 {
            self_id,
            signers,
            message,
            group_public_key,
            public_shares,
            r_per_party,
            r_total,
            challenge,
            shares,
        })))
    }
}

/// Round 2: broadcast this party's signature share, verify every peer's,
/// aggregate, and self-check under standard Ed25519 before publishing.
pub struct SignRound2 {
    self_id: PartyId,
    signers: PartySet,
    message: Vec<u8>,
    group_public_key: EdwardsPoint,
    public_shares: BTreeMap<u16, EdwardsPoint>,
    r_per_party: BTreeMap<u16, EdwardsPoint>,
    r_total: EdwardsPoint,
    challenge: Scalar,
    shares: BTreeMap<u16, Scalar>,
}

#[async_trait::async_trait]
impl Round for SignRound2 {
    type Output = SignOutput;

    fn on_enter(&mut self) -> Result<Vec<Frame>> {
        let own_z = self.shares[&self.self_id.get()];
        Ok(vec![Frame::Sign2 {
            from: self.self_id,
            z: own_z,
        }])
    }

    fn store_message(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::Sign2 { from, z } => {
                if !self.signers.contains(from) {
                    return Err(Error::UnknownSender { party_id: from.get() });
                }
                match self.shares.get(&from.get()) {
                    Some(&existing) if existing == z => Ok(()),
                    Some(_) => Err(Error::DuplicateSender { party_id: from.get() }),
                    None => {
                        self.shares.insert(from.get(), z);
                        Ok(())
                    }
                }
            }
            other => Err(Error::WrongType { party_id: other.from().get() }),
        }
    }

    fn is_ready(&self) -> bool {
        self.shares.len() == self.signers.len()
    }

    async fn process_messages(&mut self) -> Result<()> {
        let signer_ids: Vec<PartyId> = self.signers.iter().collect();
        for (&from, &z) in self.shares.iter() {
            if from == self.self_id.get() {
                continue;
            }
            let from_id = PartyId::try_from(from).expect("stored under a valid party id");
            let lambda_j = lagrange_coefficient(from_id, &signer_ids)?;
            let r_j = self.r_per_party[&from];
            let a_j = self.public_shares[&from];
            let expected = r_j + a_j * (self.challenge * lambda_j);
            if basepoint() * z != expected {
                return Err(Error::InvalidSigShare { party_id: from });
            }
        }
        Ok(())
    }

    fn generate_messages(&mut self) -> Result<Vec<Frame>> {
        Ok(vec![])
    }

    fn next_round(self: Box<Self>) -> Result<NextRound<SignOutput>> {
        let SignRound2 {
            message,
            group_public_key,
            r_total,
            shares,
            ..
        } = *self;

        let mut s_total = Scalar::ZERO;
        for s in shares.values() {
            s_total += s;
        }

        let output = SignOutput {
            r: r_total,
            s: s_total,
        };

        // Spec §4.5's terminal step: verify under standard Ed25519 before
        // ever emitting the signature. Failure here indicates a logic
        // error or out-of-spec peer input that slipped every prior check,
        // so it carries no offender attribution.
        let verifying_key = VerifyingKey::from_bytes(&group_public_key.compress().to_bytes())
            .map_err(|_| Error::InvalidSignature)?;
        let signature = Ed25519Signature::from_bytes(&output.to_signature_bytes());
        verifying_key
            .verify_strict(&message, &signature)
            .map_err(|_| Error::InvalidSignature)?;

        Ok(NextRound::Terminal(output))
    }
}

fn basepoint() -> EdwardsPoint {
    curve25519_dalek::constants::ED25519_BASEPOINT_POINT
}

fn nonzero_scalar() -> Scalar {
    loop {
        let s = Scalar::random(&mut OsRng);
        if s != Scalar::ZERO {
            return s;
        }
    }
}

/// `B = concat over k ∈ S (ascending) of (k:u16 ‖ D_k ‖ E_k)`.
fn canonical_binding(signer_ids: &[PartyId], received: &BTreeMap<u16, (EdwardsPoint, EdwardsPoint)>) -> Vec<u8> {
    let mut binding = Vec::with_capacity(signer_ids.len() * (2 + 32 + 32));
    for &k in signer_ids {
        let &(d, e) = &received[&k.get()];
        binding.extend_from_slice(&k.get().to_be_bytes());
        binding.extend_from_slice(d.compress().as_bytes());
        binding.extend_from_slice(e.compress().as_bytes());
    }
    binding
}

/// `ρ_k = H2s("FROST-rho" ‖ k:u16 ‖ M ‖ B)`, SHA-512 reduced mod `ℓ`.
fn binding_factor(k: PartyId, message: &[u8], binding: &[u8]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(b"FROST-rho");
    hasher.update(k.get().to_be_bytes());
    hasher.update(message);
    hasher.update(binding);
    Scalar::from_bytes_mod_order_wide(&hasher.finalize().into())
}

/// The standard Ed25519 challenge `c = SHA-512(R ‖ A ‖ M) mod ℓ`.
fn ed25519_challenge(r: EdwardsPoint, a: EdwardsPoint, message: &[u8]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(r.compress().as_bytes());
    hasher.update(a.compress().as_bytes());
    hasher.update(message);
    Scalar::from_bytes_mod_order_wide(&hasher.finalize().into())
}
