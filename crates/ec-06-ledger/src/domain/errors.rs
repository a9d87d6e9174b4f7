//! # Domain Errors
//!
//! Error types for the ledger and its persistence port.

use super::block::EntryKind;
use shared_types::ProposalId;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The entry's logical key is already on the chain. Treat as "already recorded".
    #[error("Duplicate entry: {kind} for {proposal_id} is already recorded")]
    DuplicateEntry {
        kind: EntryKind,
        proposal_id: ProposalId,
    },

    /// A Bundle was appended before its Proposal.
    #[error("Unknown proposal {proposal_id}: bundle has no anchored proposal")]
    UnknownProposal { proposal_id: ProposalId },

    #[error("No block or proposal with hash {hash}")]
    NotFound { hash: String },

    /// The persisted chain failed verification.
    #[error("Corrupt ledger: {reason}")]
    CorruptLedger { reason: String },

    #[error("Block serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of a [`crate::LedgerStore`] adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Ledger I/O failed on {path}: {message}")]
    Io { path: String, message: String },

    /// Stored bytes are not a block sequence.
    #[error("Ledger file {path} is malformed: {message}")]
    Format { path: String, message: String },
}
