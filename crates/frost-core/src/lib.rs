//! # frost-core
//!
//! Core protocol for a **FROST threshold signature system over Ed25519**:
//! a round-based multi-party protocol by which a set of parties jointly
//! generate an Ed25519-compatible public key, each holding only a Shamir
//! share of the secret, and later any quorum of `t+1` parties cooperatively
//! produces a standard Ed25519 signature.
//!
//! The crate covers two protocols and the state machine that drives them:
//!
//! - [`keygen`] — a two-round Pedersen-style VSS distributed key generation.
//! - [`sign`] — a two-round FROST threshold signing protocol.
//! - [`driver`] — the round-driver state machine both protocols run under.
//!
//! Transport, CLI/demo drivers, on-disk share storage, and any adversarial
//! test channel are out of scope: this crate only depends on the
//! [`transport::Transport`] contract, and ships an in-memory implementation
//! of it for tests and the `frost-party` demo binary.
//!
//! ## Example
//!
//! ```rust,ignore
//! use frost_core::{driver, keygen::KeyGenRound1, party::PartySet, transport::MemoryHub};
//!
//! let parties = PartySet::new([1, 2, 3])?;
//! let (hub, transports) = MemoryHub::new(&parties);
//! let round = Box::new(KeyGenRound1::new(self_id, parties, 1, None)?);
//! let (_cancel, token) = driver::cancel_pair();
//! let output = driver::run(self_id, &transports[0], round, token).await?;
//! ```

pub mod codec;
pub mod driver;
pub mod error;
pub mod keygen;
pub mod output;
pub mod party;
pub mod polynomial;
pub mod sign;
pub mod transport;

pub use error::{Error, Result};
pub use output::{KeyGenOutput, SignOutput};
pub use party::{PartyId, PartySet};

/// Crate version, re-exported the way the teacher exposes `VERSION`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
