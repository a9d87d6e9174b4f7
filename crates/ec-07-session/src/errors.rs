//! Session error type.
//!
//! Lower-layer failures convert with `#[from]`; collaborator failures carry
//! the collaborator's own message.

use crate::config::ConfigError;
use ec_01_identity::IdentityError;
use ec_02_expiry_clock::ClockError;
use ec_03_codec::{CodecError, DecodeError};
use ec_04_consistency::ConsistencyError;
use ec_05_verdict_tally::TallyError;
use ec_06_ledger::LedgerError;
use shared_types::{EntityError, ProposalId};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The draft is missing a field or has an unusable value.
    #[error("Invalid draft: {field} {reason}")]
    InvalidDraft { field: &'static str, reason: String },

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error(transparent)]
    Tally(#[from] TallyError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    /// The canonical remote store failed or refused a call.
    #[error("Canonical store error: {0}")]
    Store(String),

    /// The mail transport failed.
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("{0} is not a recipient of this round")]
    UnknownRecipient(String),

    #[error("Round still waiting on {}", .pending.join(", "))]
    RoundIncomplete { pending: Vec<String> },

    /// A Bundle names a Proposal this ledger never anchored.
    #[error("Proposal {proposal_id} is not anchored in the ledger")]
    NotAnchored { proposal_id: ProposalId },

    /// A Bundle's copy of the Proposal differs from the anchored one.
    #[error("Bundle for {proposal_id} disagrees with the anchored proposal on {field}")]
    AnchorMismatch {
        proposal_id: ProposalId,
        field: &'static str,
    },

    /// Ballot text matches no supported action's answers.
    #[error("Ballot content {0:?} is not a recognised answer")]
    UnrecognizedBallot(String),
}
