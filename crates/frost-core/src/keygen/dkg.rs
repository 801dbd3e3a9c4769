//! Keygen round 1 (commit) and round 2 (share + verify), grounded on the
//! teacher's `keygen::dkg::{generate_secret_polynomial, evaluate_polynomial,
//! verify_share, compute_public_key, compute_public_shares}` shape, carried
//! over Pedersen commitments of degree `t` instead of the teacher's
//! k256/single-point stand-in.

use crate::codec::Frame;
use crate::driver::{NextRound, Round};
use crate::error::{Error, Result};
use crate::output::KeyGenOutput;
use crate::party::{validate_threshold, PartyId, PartySet};
use crate::polynomial::{Commitments, Polynomial};
use curve25519_dalek::{constants::ED25519_BASEPOINT_POINT, EdwardsPoint, Scalar};
use rand::rngs::OsRng;
use std::collections::BTreeMap;
use zeroize::Zeroize;

/// Round 1: sample a degree-`t` polynomial, broadcast its commitments, and
/// collect every peer's commitments.
pub struct KeyGenRound1 {
    self_id: PartyId,
    parties: PartySet,
    threshold: usize,
    polynomial: Polynomial,
    received: BTreeMap<u16, Commitments>,
}

impl KeyGenRound1 {
    /// Start a fresh keygen session. `seed_secret`, if given, fixes this
    /// party's polynomial constant term instead of sampling it (spec
    /// §4.4's "if the caller seeded a secret").
    pub fn new(
        self_id: PartyId,
        parties: PartySet,
        threshold: usize,
        seed_secret: Option<Scalar>,
    ) -> Result<Self> {
        validate_threshold(&parties, threshold)?;
        if !parties.contains(self_id) {
            return Err(Error::InvalidParty(format!(
                "self id {self_id} is not a member of the party set"
            )));
        }

        let polynomial = Polynomial::sample(&mut OsRng, threshold, seed_secret);
        let own_commitments = polynomial.commit();
        let mut received = BTreeMap::new();
        received.insert(self_id.get(), own_commitments);

        Ok(Self {
            self_id,
            parties,
            threshold,
            polynomial,
            received,
        })
    }
}

#[async_trait::async_trait]
impl Round for KeyGenRound1 {
    type Output = KeyGenOutput;

    fn on_enter(&mut self) -> Result<Vec<Frame>> {
        let commitments = self.received[&self.self_id.get()].clone();
        Ok(vec![Frame::KeyGen1 {
            from: self.self_id,
            commitments,
        }])
    }

    fn store_message(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::KeyGen1 { from, commitments } => {
                if !self.parties.contains(from) {
                    return Err(Error::UnknownSender { party_id: from.get() });
                }
                if commitments.points().len() != self.threshold + 1 {
                    return Err(Error::InvalidMessage {
                        party_id: from.get(),
                        reason: "commitment vector has the wrong length".into(),
                    });
                }
                match self.received.get(&from.get()) {
                    Some(existing) if existing == &commitments => Ok(()),
                    Some(_) => Err(Error::DuplicateSender { party_id: from.get() }),
                    None => {
                        self.received.insert(from.get(), commitments);
                        Ok(())
                    }
                }
            }
            Frame::KeyGen2 { from, .. } => Err(Error::WrongRound { party_id: from.get() }),
            other => Err(Error::WrongType { party_id: other.from().get() }),
        }
    }

    fn is_ready(&self) -> bool {
        self.received.len() == self.parties.len()
    }

    async fn process_messages(&mut self) -> Result<()> {
        // Shape and decodability were already checked at store time; there
        // is nothing further to verify before emitting round 2's shares.
        Ok(())
    }

    fn generate_messages(&mut self) -> Result<Vec<Frame>> {
        let mut out = Vec::with_capacity(self.parties.len() - 1);
        for id in self.parties.iter() {
            if id == self.self_id {
                continue;
            }
            let share = self.polynomial.evaluate_at_party(id);
            out.push(Frame::KeyGen2 {
                from: self.self_id,
                to: id,
                share,
            });
        }
        Ok(out)
    }

    fn next_round(self: Box<Self>) -> Result<NextRound<KeyGenOutput>> {
        let KeyGenRound1 {
            self_id,
            parties,
            threshold,
            polynomial,
            received,
        } = *self;

        let own_share = polynomial.evaluate_at_party(self_id);
        // `polynomial` drops (and zeroizes) here; round 2 needs only the
        // evaluated share, not the coefficients (spec §3: "higher
        // coefficients are discarded after round 1").
        let mut shares = BTreeMap::new();
        shares.insert(self_id.get(), own_share);

        Ok(NextRound::Round(Box::new(KeyGenRound2 {
            self_id,
            parties,
            threshold,
            commitments: received,
            shares,
        })))
    }
}

/// Round 2: exchange and verify Shamir shares against round 1's
/// commitments, then publish the group key, public shares, and this
/// party's private share.
pub struct KeyGenRound2 {
    self_id: PartyId,
    parties: PartySet,
    threshold: usize,
    commitments: BTreeMap<u16, Commitments>,
    shares: BTreeMap<u16, Scalar>,
}

#[async_trait::async_trait]
impl Round for KeyGenRound2 {
    type Output = KeyGenOutput;

    fn on_enter(&mut self) -> Result<Vec<Frame>> {
        // Round 1's `generate_messages` already dispatched every share;
        // round 2 has nothing of its own to send.
        Ok(vec![])
    }

    fn store_message(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::KeyGen2 { from, to, share } => {
                if to != self.self_id {
                    return Err(Error::InvalidMessage {
                        party_id: from.get(),
                        reason: "share addressed to a different party".into(),
                    });
                }
                if !self.parties.contains(from) {
                    return Err(Error::UnknownSender { party_id: from.get() });
                }
                match self.shares.get(&from.get()) {
                    Some(existing) if *existing == share => Ok(()),
                    Some(_) => Err(Error::DuplicateSender { party_id: from.get() }),
                    None => {
                        self.shares.insert(from.get(), share);
                        Ok(())
                    }
                }
            }
            other => Err(Error::WrongType { party_id: other.from().get() }),
        }
    }

    fn is_ready(&self) -> bool {
        self.shares.len() == self.parties.len()
    }

    async fn process_messages(&mut self) -> Result<()> {
        for (&from, share) in self.shares.iter() {
            if from == self.self_id.get() {
                continue;
            }
            let commitments = &self.commitments[&from];
            let expected = commitments.evaluate_at_party(self.self_id);
            if ED25519_BASEPOINT_POINT * share != expected {
                return Err(Error::InvalidShare { party_id: from });
            }
        }
        Ok(())
    }

    fn generate_messages(&mut self) -> Result<Vec<Frame>> {
        Ok(vec![])
    }

    fn next_round(self: Box<Self>) -> Result<NextRound<KeyGenOutput>> {
        let KeyGenRound2 {
            parties,
            threshold,
            commitments,
            mut shares,
            ..
        } = *self;

        let mut group_public_key = EdwardsPoint::default();
        for c in commitments.values() {
            group_public_key += c.constant();
        }

        let mut public_shares = BTreeMap::new();
        for id in parties.iter() {
            let mut acc = EdwardsPoint::default();
            for c in commitments.values() {
                acc += c.evaluate_at_party(id);
            }
            public_shares.insert(id.get(), acc);
        }

        let mut secret_share = Scalar::ZERO;
        for s in shares.values() {
            secret_share += s;
        }
        for s in shares.values_mut() {
            s.zeroize();
        }

        Ok(NextRound::Terminal(KeyGenOutput {
            group_public_key,
            public_shares,
            parties,
            threshold,
            secret_share,
        }))
    }
}
