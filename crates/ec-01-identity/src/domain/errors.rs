//! Error types for the identity subsystem.

use shared_types::{EntityError, ProposalId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid proposal content: {reason}")]
    InvalidContent { reason: String },

    /// Recomputed id disagrees with the claimed one. Treated as tampering.
    #[error("Identity mismatch: claimed {claimed}, recomputed {recomputed}")]
    IdentityMismatch {
        claimed: ProposalId,
        recomputed: ProposalId,
    },

    #[error("Canonical serialization failed: {0}")]
    Canonicalization(String),

    #[error(transparent)]
    Entity(#[from] EntityError),
}
