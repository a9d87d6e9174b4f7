//! Error types for the wire codec.

use ec_01_identity::IdentityError;
use shared_types::{BlockKind, EntityError, ProposalId};
use std::fmt;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEdge {
    Start,
    End,
}

impl fmt::Display for MarkerEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerEdge::Start => f.write_str("START"),
            MarkerEdge::End => f.write_str("END"),
        }
    }
}

/// Wire text that is not a valid block. Nothing was decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("No {kind} block: {edge} marker not found")]
    MissingMarker { kind: BlockKind, edge: MarkerEdge },

    #[error("{kind} block has text before {label:?}")]
    UnexpectedText { kind: BlockKind, label: &'static str },

    #[error("{kind} block is missing {label:?}")]
    MissingField { kind: BlockKind, label: &'static str },

    #[error("{kind} block field {label:?} is empty")]
    EmptyField { kind: BlockKind, label: &'static str },

    #[error("{label:?} is not a 64-character hex hash: {value:?}")]
    MalformedId { label: &'static str, value: String },

    #[error("{label:?} is not a canonical timestamp: {value:?}")]
    NonCanonicalTimestamp { label: &'static str, value: String },

    #[error("Action instructions do not quote a YES and a NO answer")]
    MissingActionInstructions,

    #[error("Unrecognized answer pair ({yes:?}, {no:?})")]
    UnrecognizedAnswerPair { yes: String, no: String },

    #[error("Unsupported action {0:?}")]
    UnknownAction(String),

    #[error("Unrecognized verdict {0:?}")]
    UnrecognizedVerdict(String),

    #[error("{recipients} recipients but {responses} responses")]
    CountMismatch { recipients: usize, responses: usize },

    #[error("Recipient {0:?} is listed more than once")]
    DuplicateRecipient(String),

    #[error("Decoded proposal is invalid: {0}")]
    InvalidProposal(EntityError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The claimed id does not recompute from the decoded fields.
    #[error("Identity mismatch: claimed {claimed}, recomputed {recomputed}")]
    IdentityMismatch {
        claimed: ProposalId,
        recomputed: ProposalId,
    },

    /// Indeterminate bundles carry no verdict and are never sent.
    #[error("Bundle for {proposal_id} is indeterminate and cannot be encoded")]
    IndeterminateBundle { proposal_id: ProposalId },

    #[error(transparent)]
    Identity(IdentityError),
}

impl From<IdentityError> for CodecError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::IdentityMismatch {
                claimed,
                recomputed,
            } => CodecError::IdentityMismatch {
                claimed,
                recomputed,
            },
            IdentityError::Entity(e) => CodecError::Decode(DecodeError::InvalidProposal(e)),
            other => CodecError::Identity(other),
        }
    }
}

impl CodecError {
    /// True for structural decode failures, false for tampering or encode errors.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, CodecError::Decode(_))
    }
}
