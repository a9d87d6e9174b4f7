//! Driven ports (Outbound dependencies)
//!
//! Both collaborators are consumed, never re-implemented here. Their failures
//! are reported as plain messages and surface as `SessionError::Store` or
//! `SessionError::Transport`.

use async_trait::async_trait;
use ec_04_consistency::{ConsistencyReport, ProposalTerms};
use serde::{Deserialize, Serialize};
use shared_types::{BusinessRequirement, HexHash, OffsetTimestamp, ProposalId};
use std::fmt;

/// What the canonical store holds for an anchored Proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    /// Logical key, `sha256(leaderAddress ‖ subject)`.
    pub key: HexHash,
    pub proposal_id: ProposalId,
    /// Compact window, `<createdAt> +<durationSpec>`.
    pub window: String,
    pub expires_at: OffsetTimestamp,
    pub business_requirement: BusinessRequirement,
    pub content_hash: HexHash,
}

impl AnchorRecord {
    /// The terms the store recorded for this Proposal.
    pub fn terms(&self) -> ProposalTerms {
        ProposalTerms::new(
            self.content_hash.clone(),
            self.expires_at,
            self.business_requirement,
        )
    }
}

/// The store's own tally of a finalized Proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBundle {
    pub accepted: bool,
    pub proposal_id: ProposalId,
    pub vote_count: usize,
    pub voters: Vec<String>,
}

impl fmt::Display for RemoteBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bundle:")?;
        writeln!(
            f,
            "Verdict: {}",
            if self.accepted { "Accepted" } else { "Rejected" }
        )?;
        writeln!(f, "Vote Count: {}", self.vote_count)?;
        writeln!(f, "Message ID: {}", self.proposal_id)?;
        write!(f, "Voters: [{}]", self.voters.join(", "))
    }
}

/// Canonical remote store (smart-contract style).
///
/// Contract-level atomicity on the store is what keeps two leaders from
/// anchoring different Proposals under one logical key.
#[async_trait]
pub trait CanonicalStore: Send + Sync {
    /// Whether a Proposal is anchored under `key`. Checked before `anchored`.
    async fn exists(&self, key: &HexHash) -> Result<bool, String>;

    /// The record anchored under `key`, if any.
    async fn anchored(&self, key: &HexHash) -> Result<Option<AnchorRecord>, String>;

    /// Anchor a new Proposal. Fails if `record.key` is already taken.
    async fn create(&self, record: AnchorRecord) -> Result<(), String>;

    async fn register_voter(&self, proposal_id: &ProposalId, recipient: &str)
        -> Result<(), String>;

    /// Record a vote; `choice` is the lowercased ballot content.
    async fn vote(&self, proposal_id: &ProposalId, choice: &str) -> Result<(), String>;

    /// The store's comparison of `terms` against what it anchored under `key`.
    async fn check_consistency(
        &self,
        key: &HexHash,
        terms: &ProposalTerms,
    ) -> Result<ConsistencyReport, String>;

    async fn consensus_finalize(&self, proposal_id: &ProposalId) -> Result<(), String>;

    async fn is_finalized(&self, proposal_id: &ProposalId) -> Result<bool, String>;

    async fn fetch_bundle(&self, proposal_id: &ProposalId) -> Result<RemoteBundle, String>;
}

/// Which received mail to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailFilter {
    pub subject: Option<String>,
    pub from: Option<String>,
}

impl MailFilter {
    pub fn subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            from: None,
        }
    }

    pub fn matches(&self, mail: &InboundMail) -> bool {
        self.subject.as_ref().map_or(true, |s| s == &mail.subject)
            && self
                .from
                .as_ref()
                .map_or(true, |f| f.eq_ignore_ascii_case(&mail.from))
    }
}

/// A received message, as the transport reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMail {
    pub from: String,
    pub subject: String,
    pub sent_at: OffsetTimestamp,
    pub body: String,
}

/// Mail transport. Only body text crosses this boundary.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String>;

    async fn receive(&self, filter: &MailFilter) -> Result<Vec<InboundMail>, String>;
}
