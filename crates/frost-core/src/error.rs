//! Error types for the FROST threshold protocol

use thiserror::Error;

/// Result type alias for FROST operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during keygen or signing, each attributed to the
/// party responsible where the protocol can tell (`0` means "no specific
/// attribution" — see [`Error::party_id`]).
#[derive(Debug, Error)]
pub enum Error {
    /// A frame failed to decode, or its body did not match its type
    #[error("invalid message from party {party_id}: {reason}")]
    InvalidMessage { party_id: u16, reason: String },

    /// A frame's `from` field is not a member of the active party set
    #[error("unknown sender: party {party_id}")]
    UnknownSender { party_id: u16 },

    /// A peer sent two distinct frames for the same round
    #[error("party {party_id} sent conflicting messages for this round")]
    DuplicateSender { party_id: u16 },

    /// A frame belongs to a round later than the one in progress; the
    /// driver stages it rather than treating it as fatal
    #[error("frame from party {party_id} is for a later round")]
    WrongRound { party_id: u16 },

    /// A frame type does not belong to the protocol in progress
    #[error("unexpected frame type from party {party_id}")]
    WrongType { party_id: u16 },

    /// A keygen round-2 share did not match its sender's commitments
    #[error("invalid share from party {party_id}")]
    InvalidShare { party_id: u16 },

    /// A sign round-2 share did not satisfy the verification equation
    #[error("invalid signature share from party {party_id}")]
    InvalidSigShare { party_id: u16 },

    /// The aggregated signature failed standard Ed25519 verification
    #[error("aggregated signature failed verification")]
    InvalidSignature,

    /// Malformed party set or threshold out of range
    #[error("invalid party configuration: {0}")]
    InvalidParty(String),

    /// The caller cancelled the session
    #[error("session cancelled")]
    Cancelled,
}

impl Error {
    /// The party this error is attributed to, or `0` if the error is not
    /// attributable to a single party.
    pub fn party_id(&self) -> u16 {
        match self {
            Error::InvalidMessage { party_id, .. }
            | Error::UnknownSender { party_id }
            | Error::DuplicateSender { party_id }
            | Error::WrongRound { party_id }
            | Error::WrongType { party_id }
            | Error::InvalidShare { party_id }
            | Error::InvalidSigShare { party_id } => *party_id,
            Error::InvalidSignature | Error::InvalidParty(_) | Error::Cancelled => 0,
        }
    }
}
