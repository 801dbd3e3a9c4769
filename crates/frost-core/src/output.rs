//! Terminal artifacts produced by the two protocols (spec §4.6).

use crate::party::{PartyId, PartySet};
use curve25519_dalek::{EdwardsPoint, Scalar};
use std::collections::BTreeMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// What a party holds after a successful DKG run.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyGenOutput {
    #[zeroize(skip)]
    pub group_public_key: EdwardsPoint,
    #[zeroize(skip)]
    pub public_shares: BTreeMap<u16, EdwardsPoint>,
    #[zeroize(skip)]
    pub parties: PartySet,
    pub threshold: usize,
    /// This party's private Shamir share `s_i`, zeroed on drop.
    pub secret_share: Scalar,
}

impl KeyGenOutput {
    /// The 32-byte compressed encoding a standard Ed25519 verifier accepts.
    pub fn to_verifying_key_bytes(&self) -> [u8; 32] {
        self.group_public_key.compress().to_bytes()
    }

    /// This party's public share `A_i = g^{s_i}`, if present.
    pub fn public_share(&self, id: PartyId) -> Option<EdwardsPoint> {
        self.public_shares.get(&id.get()).copied()
    }
}

impl std::fmt::Debug for KeyGenOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGenOutput")
            .field("group_public_key", &hex::encode(self.to_verifying_key_bytes()))
            .field("threshold", &self.threshold)
            .field("parties", &self.parties)
            .finish_non_exhaustive()
    }
}

/// A completed FROST signature `(R, S)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignOutput {
    pub r: EdwardsPoint,
    pub s: Scalar,
}

impl SignOutput {
    /// The 64-byte `R ‖ S` encoding a standard Ed25519 verifier accepts.
    pub fn to_signature_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.r.compress().as_bytes());
        bytes[32..].copy_from_slice(self.s.as_bytes());
        bytes
    }
}
