//! Threshold signing (spec §4.5): a two-round FROST protocol producing a
//! deterministic-verifier Ed25519 signature over a caller-supplied message.

mod dsg;

pub use dsg::{SignRound1, SignRound2};
