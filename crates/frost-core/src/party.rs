//! Party identifiers and party sets
//!
//! IDs are nonzero 16-bit values; `0` is reserved on the wire to mean
//! "broadcast to all" (see [`crate::codec`]).

use crate::error::{Error, Result};
use std::num::NonZeroU16;

/// Identifier for a party in the MPC network. Always nonzero: `0` is
/// reserved for the broadcast recipient in a frame's `to` field and can
/// never name a real party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyId(NonZeroU16);

impl PartyId {
    /// The raw 16-bit value.
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

impl TryFrom<u16> for PartyId {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        NonZeroU16::new(value)
            .map(PartyId)
            .ok_or_else(|| Error::InvalidParty("party id 0 is reserved for broadcast".into()))
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, deduplicated set of [`PartyId`]s fixed for the lifetime of a
/// protocol instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartySet {
    ids: Vec<PartyId>,
}

impl PartySet {
    /// Build a party set from raw 16-bit ids, sorting and deduplicating.
    /// Rejects `0` and an empty set with [`Error::InvalidParty`].
    pub fn new(ids: impl IntoIterator<Item = u16>) -> Result<Self> {
        let mut parsed: Vec<PartyId> = ids
            .into_iter()
            .map(PartyId::try_from)
            .collect::<Result<_>>()?;
        parsed.sort_unstable();
        parsed.dedup();

        if parsed.is_empty() {
            return Err(Error::InvalidParty("party set must be nonempty".into()));
        }

        Ok(Self { ids: parsed })
    }

    /// Party ids in deterministic ascending order.
    pub fn ids(&self) -> &[PartyId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = PartyId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: PartyId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }
}

/// Validate `0 < threshold < parties.len()` (so `threshold + 1 <= N`),
/// matching the teacher's `SessionConfig::new` validation pattern.
pub fn validate_threshold(parties: &PartySet, threshold: usize) -> Result<()> {
    if threshold == 0 {
        return Err(Error::InvalidParty("threshold must be at least 1".into()));
    }
    if threshold >= parties.len() {
        return Err(Error::InvalidParty(format!(
            "threshold {} must be less than party count {}",
            threshold,
            parties.len()
        )));
    }
    Ok(())
}
