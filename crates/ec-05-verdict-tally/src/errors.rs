//! Error types for tallying.

use shared_types::{BundleVerdict, ProposalId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TallyError {
    /// A tally needs at least one expected recipient.
    #[error("No ballots to tally")]
    NoBallots,

    #[error("Ballot content {content:?} matches neither {expected_yes:?} nor {expected_no:?}")]
    UnrecognizedBallotContent {
        content: String,
        expected_yes: String,
        expected_no: String,
    },

    /// A Bundle's recorded verdict differs from the one its ballots produce.
    #[error("Bundle {proposal_id} claims {claimed} but its ballots give {recomputed}")]
    VerdictMismatch {
        proposal_id: ProposalId,
        claimed: BundleVerdict,
        recomputed: BundleVerdict,
    },
}
