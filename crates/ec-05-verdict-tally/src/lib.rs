//! # Verdict Tally (ec-05)
//!
//! Reduces per-recipient ballots into a supermajority verdict, assembles
//! Bundles, and lets any holder of a Bundle recompute its verdict.
//!
//! ## Policy
//!
//! - A Proposal is accepted iff at least 4/5 of all expected recipients said
//!   yes. The ratio is compared in integers (`yes * 5 >= total * 4`).
//! - Absent and invalid ballots stay in the denominator and count as "no".
//! - Content matching neither expected answer is an error, never a default
//!   vote.

pub mod bundle;
pub mod errors;
pub mod tally;

pub use bundle::{assemble_bundle, audit_bundle, recompute_verdict};
pub use errors::TallyError;
pub use tally::{classify, tally, Tally, Verdict, SUPERMAJORITY_DENOMINATOR, SUPERMAJORITY_NUMERATOR};
