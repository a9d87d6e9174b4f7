//! # Consistency Checker (ec-04)
//!
//! Compares two descriptions of the same Proposal (e.g. the leader's local
//! view and the canonical remote store's record) term by term. Each term is
//! reported separately so the caller can name exactly what drifted.
//!
//! | Term | Compared as |
//! |------|-------------|
//! | content | SHA-256 of the content, never the raw text |
//! | expiry | absolute instant, offsets normalized away |
//! | business requirement | integer percentage |

use ec_01_identity::content_hash;
use serde::{Deserialize, Serialize};
use shared_types::{BusinessRequirement, HexHash, OffsetTimestamp, Proposal};
use std::fmt;
use tracing::debug;

/// The terms of a Proposal that two observers must agree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTerms {
    pub content_hash: HexHash,
    pub expires_at: OffsetTimestamp,
    pub business_requirement: BusinessRequirement,
}

impl ProposalTerms {
    pub fn new(
        content_hash: HexHash,
        expires_at: OffsetTimestamp,
        business_requirement: BusinessRequirement,
    ) -> Self {
        Self {
            content_hash,
            expires_at,
            business_requirement,
        }
    }

    /// Terms of a Proposal under the given business requirement.
    pub fn of(proposal: &Proposal, business_requirement: BusinessRequirement) -> Self {
        Self::new(
            content_hash(proposal.content()),
            proposal.expires_at(),
            business_requirement,
        )
    }
}

/// A term that can drift between two views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    Content,
    Expiry,
    BusinessRequirement,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Content => f.write_str("message contents"),
            Term::Expiry => f.write_str("expiry date"),
            Term::BusinessRequirement => f.write_str("business percentage"),
        }
    }
}

/// Per-term agreement between two views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub content_matches: bool,
    pub expiry_matches: bool,
    pub business_requirement_matches: bool,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.content_matches && self.expiry_matches && self.business_requirement_matches
    }

    /// Terms that disagree, in a fixed order.
    pub fn drifted(&self) -> Vec<Term> {
        [
            (Term::Content, self.content_matches),
            (Term::Expiry, self.expiry_matches),
            (Term::BusinessRequirement, self.business_requirement_matches),
        ]
        .into_iter()
        .filter_map(|(term, matches)| (!matches).then_some(term))
        .collect()
    }

    /// Both reports' disagreements: a term matches only if it matches in both.
    pub fn combine(self, other: ConsistencyReport) -> ConsistencyReport {
        ConsistencyReport {
            content_matches: self.content_matches && other.content_matches,
            expiry_matches: self.expiry_matches && other.expiry_matches,
            business_requirement_matches: self.business_requirement_matches
                && other.business_requirement_matches,
        }
    }

    pub fn into_result(self) -> Result<(), ConsistencyError> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(ConsistencyError::Mismatch {
                drifted: self.drifted(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("Consistency mismatch: {} differ", describe(.drifted))]
    Mismatch { drifted: Vec<Term> },
}

fn describe(terms: &[Term]) -> String {
    terms
        .iter()
        .map(Term::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compare `local` against `remote`, term by term.
pub fn check(local: &ProposalTerms, remote: &ProposalTerms) -> ConsistencyReport {
    let report = ConsistencyReport {
        content_matches: local.content_hash == remote.content_hash,
        expiry_matches: local.expires_at.instant() == remote.expires_at.instant(),
        business_requirement_matches: local.business_requirement == remote.business_requirement,
    };
    if !report.is_consistent() {
        debug!("[ec-04] drift detected: {:?}", report.drifted());
    }
    report
}
