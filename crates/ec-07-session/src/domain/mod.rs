//! Session domain: proposal drafts and ballot rounds.

pub mod draft;
pub mod round;

pub use draft::ProposalDraft;
pub use round::{BallotRound, ReplyOutcome};
