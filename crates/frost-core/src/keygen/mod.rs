//! Distributed Key Generation (spec §4.4): a two-round Pedersen-style VSS
//! producing a group public key, per-party public shares, and a private
//! Shamir share held only by this party.

mod dkg;

pub use dkg::{KeyGenRound1, KeyGenRound2};
