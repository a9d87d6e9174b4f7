//! # Core Protocol Entities
//!
//! ## Clusters
//!
//! - **Identity**: `HexHash`, `ProposalId`
//! - **Round**: `Proposal`, `ActionKind`, `BusinessRequirement`
//! - **Answers**: `Ballot`, `BallotSlot`
//! - **Outcome**: `Bundle`, `BundleVerdict`

use crate::errors::EntityError;
use crate::time::OffsetTimestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A SHA-256 digest rendered as 64 lowercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexHash(String);

/// A Proposal's content-derived identity.
pub type ProposalId = HexHash;

impl HexHash {
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 64;

    /// Parse exactly 64 hex characters; uppercase input is folded to lowercase.
    pub fn parse(input: &str) -> Result<Self, EntityError> {
        if input.len() != Self::HEX_LEN || !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EntityError::InvalidHash {
                input: input.to_string(),
            });
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    /// Render raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// The all-zero digest.
    pub fn zero() -> Self {
        Self("0".repeat(Self::HEX_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for HexHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexHash {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexHash {
    type Error = EntityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexHash> for String {
    fn from(value: HexHash) -> Self {
        value.0
    }
}

// =============================================================================
// CLUSTER B: THE ROUND
// =============================================================================

/// The kind of binary decision a Proposal asks for.
///
/// Each kind fixes the pair of answers a recipient may give. The mapping from
/// answer pair back to kind is an explicit table, checked by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Approval,
}

impl ActionKind {
    /// Every supported kind.
    pub const ALL: [ActionKind; 1] = [ActionKind::Approval];

    /// Name carried in Bundle wire text.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Approval => "approval",
        }
    }

    /// The (yes, no) words recipients fill into "I <word>".
    pub fn expected_words(&self) -> (&'static str, &'static str) {
        match self {
            ActionKind::Approval => ("approve", "disapprove"),
        }
    }

    /// The full (yes, no) ballot contents, e.g. `("I approve", "I disapprove")`.
    pub fn expected_responses(&self) -> (String, String) {
        let (yes, no) = self.expected_words();
        (format!("I {}", yes), format!("I {}", no))
    }

    /// The ballot content a recipient sends for `choice`.
    pub fn response_for(&self, choice: Choice) -> String {
        let (yes, no) = self.expected_responses();
        match choice {
            Choice::Yes => yes,
            Choice::No => no,
        }
    }

    /// Derive the kind from an answer pair found in wire text.
    ///
    /// Matching ignores case and collapses internal whitespace.
    pub fn from_expected_pair(yes: &str, no: &str) -> Option<ActionKind> {
        let yes = normalize_answer(yes);
        let no = normalize_answer(no);
        Self::ALL.into_iter().find(|kind| {
            let (expected_yes, expected_no) = kind.expected_responses();
            normalize_answer(&expected_yes) == yes && normalize_answer(&expected_no) == no
        })
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| EntityError::UnknownAction(s.to_string()))
    }
}

/// A recipient's decision, before it is worded for a particular action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
}

impl FromStr for Choice {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Choice::Yes),
            "no" | "n" => Ok(Choice::No),
            _ => Err(EntityError::UnknownChoice(s.to_string())),
        }
    }
}

/// Lowercase and collapse whitespace runs, the comparison form for answers.
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Percentage of business sign-off the leader requires (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BusinessRequirement(u8);

impl BusinessRequirement {
    pub fn new(percent: u32) -> Result<Self, EntityError> {
        if percent > 100 {
            return Err(EntityError::InvalidBusinessRequirement(percent));
        }
        Ok(Self(percent as u8))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for BusinessRequirement {
    type Error = EntityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BusinessRequirement> for u32 {
    fn from(value: BusinessRequirement) -> Self {
        value.0 as u32
    }
}

impl fmt::Display for BusinessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A leader's content-addressed request for a binary decision.
///
/// `id` is a pure function of `(content, created_at)`. Construct through
/// `ec_01_identity::mint_proposal` (leader side) or
/// `ec_03_codec::decode_proposal` (recipient side), both of which establish
/// that relation before calling [`Proposal::assemble`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    id: ProposalId,
    content: String,
    action: ActionKind,
    created_at: OffsetTimestamp,
    expires_at: OffsetTimestamp,
}

impl Proposal {
    /// Assemble a Proposal from already-verified parts.
    ///
    /// Checks the structural invariants: content is non-empty and free of line
    /// breaks, and the expiry is strictly after creation.
    pub fn assemble(
        id: ProposalId,
        content: String,
        action: ActionKind,
        created_at: OffsetTimestamp,
        expires_at: OffsetTimestamp,
    ) -> Result<Self, EntityError> {
        if content.trim().is_empty() {
            return Err(EntityError::InvalidContent {
                reason: "content is empty",
            });
        }
        if content.contains(['\n', '\r']) {
            return Err(EntityError::InvalidContent {
                reason: "content contains a line break",
            });
        }
        if expires_at <= created_at {
            return Err(EntityError::InvalidWindow {
                created_at: created_at.to_string(),
                expires_at: expires_at.to_string(),
            });
        }
        Ok(Self {
            id,
            content,
            action,
            created_at,
            expires_at,
        })
    }

    pub fn id(&self) -> &ProposalId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn created_at(&self) -> OffsetTimestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> OffsetTimestamp {
        self.expires_at
    }

    /// The (yes, no) ballot contents this Proposal accepts.
    pub fn expected_responses(&self) -> (String, String) {
        self.action.expected_responses()
    }

    /// Whether `at` falls on or after the expiry instant.
    pub fn is_expired_at(&self, at: &OffsetTimestamp) -> bool {
        at >= &self.expires_at
    }
}

// =============================================================================
// CLUSTER C: ANSWERS
// =============================================================================

/// A single recipient's answer to a Proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub proposal_id: ProposalId,
    /// Free text expected to be one of the Proposal's two responses.
    pub content: String,
}

impl Ballot {
    pub fn new(proposal_id: ProposalId, content: impl Into<String>) -> Self {
        Self {
            proposal_id,
            content: content.into(),
        }
    }
}

/// What the leader holds for one recipient when closing a round.
///
/// `Invalid` and `Absent` both tally as "no" but stay distinguishable for
/// audit: one replied unreadably, the other never replied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "camelCase")]
pub enum BallotSlot {
    /// A structurally valid Ballot.
    Cast(Ballot),
    /// A reply that did not decode as a Ballot.
    Invalid { reason: String },
    /// No reply, or explicitly marked absent.
    Absent,
}

impl BallotSlot {
    pub fn ballot(&self) -> Option<&Ballot> {
        match self {
            BallotSlot::Cast(ballot) => Some(ballot),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, BallotSlot::Absent)
    }
}

/// Recipient mail address, the key of a Bundle's ballot map.
pub type RecipientAddress = String;

// =============================================================================
// CLUSTER D: OUTCOME
// =============================================================================

/// Verdict recorded in a Bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleVerdict {
    Accepted,
    Rejected,
    /// Validation failed; no verdict could be drawn.
    Indeterminate,
}

impl BundleVerdict {
    /// Wire keyword, `None` for indeterminate bundles (they are never sent).
    pub fn wire_keyword(&self) -> Option<&'static str> {
        match self {
            BundleVerdict::Accepted => Some("ACCEPTED"),
            BundleVerdict::Rejected => Some("REJECTED"),
            BundleVerdict::Indeterminate => None,
        }
    }
}

impl fmt::Display for BundleVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleVerdict::Accepted => f.write_str("accepted"),
            BundleVerdict::Rejected => f.write_str("rejected"),
            BundleVerdict::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

/// The leader's evidence of a completed round.
///
/// Built by `ec_05_verdict_tally::assemble_bundle`, which decides the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    proposal: Proposal,
    ballots_by_recipient: BTreeMap<RecipientAddress, BallotSlot>,
    verdict: BundleVerdict,
}

impl Bundle {
    pub fn new(
        proposal: Proposal,
        ballots_by_recipient: BTreeMap<RecipientAddress, BallotSlot>,
        verdict: BundleVerdict,
    ) -> Self {
        Self {
            proposal,
            ballots_by_recipient,
            verdict,
        }
    }

    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    pub fn ballots_by_recipient(&self) -> &BTreeMap<RecipientAddress, BallotSlot> {
        &self.ballots_by_recipient
    }

    pub fn verdict(&self) -> BundleVerdict {
        self.verdict
    }

    pub fn recipients(&self) -> impl Iterator<Item = &RecipientAddress> {
        self.ballots_by_recipient.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "e956753659a5eb089a71de989ee2ee0055ecdc0127c3856f2b1b1f6acae70b13";

    fn ts(text: &str) -> OffsetTimestamp {
        OffsetTimestamp::parse(text).unwrap()
    }

    #[test]
    fn test_hex_hash_requires_64_hex_chars() {
        assert!(HexHash::parse(ID).is_ok());
        assert!(HexHash::parse(&ID[..63]).is_err());
        assert!(HexHash::parse(&format!("{}0", ID)).is_err());
        assert!(HexHash::parse(&ID.replace('e', "g")).is_err());
    }

    #[test]
    fn test_hex_hash_folds_uppercase() {
        let upper = HexHash::parse(&ID.to_uppercase()).unwrap();
        assert_eq!(upper.as_str(), ID);
    }

    #[test]
    fn test_hex_hash_from_bytes() {
        let hash = HexHash::from_bytes([0xAB; 32]);
        assert_eq!(hash.as_str(), "ab".repeat(32));
        assert_eq!(HexHash::zero().as_str(), "0".repeat(64));
    }

    #[test]
    fn test_action_from_expected_pair() {
        assert_eq!(
            ActionKind::from_expected_pair("I approve", "I disapprove"),
            Some(ActionKind::Approval)
        );
        assert_eq!(
            ActionKind::from_expected_pair("i  APPROVE", "I\ndisapprove"),
            Some(ActionKind::Approval)
        );
        assert_eq!(ActionKind::from_expected_pair("I disapprove", "I approve"), None);
        assert_eq!(ActionKind::from_expected_pair("I agree", "I object"), None);
    }

    #[test]
    fn test_response_for_choice() {
        assert_eq!(ActionKind::Approval.response_for(Choice::Yes), "I approve");
        assert_eq!(ActionKind::Approval.response_for(Choice::No), "I disapprove");
        assert_eq!("Y".parse::<Choice>().unwrap(), Choice::Yes);
        assert!("maybe".parse::<Choice>().is_err());
    }

    #[test]
    fn test_action_parse_by_name() {
        assert_eq!("Approval".parse::<ActionKind>().unwrap(), ActionKind::Approval);
        assert!("veto".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_business_requirement_bounds() {
        assert_eq!(BusinessRequirement::new(100).unwrap().percent(), 100);
        assert_eq!(
            BusinessRequirement::new(101),
            Err(EntityError::InvalidBusinessRequirement(101))
        );
    }

    #[test]
    fn test_proposal_rejects_inverted_window() {
        let result = Proposal::assemble(
            HexHash::parse(ID).unwrap(),
            "Buy the new printer".into(),
            ActionKind::Approval,
            ts("Mon Jan 8 09:30:00 2024 +1000"),
            ts("Mon Jan 8 09:30:00 2024 +1000"),
        );
        assert!(matches!(result, Err(EntityError::InvalidWindow { .. })));
    }

    #[test]
    fn test_proposal_rejects_line_breaks() {
        let result = Proposal::assemble(
            HexHash::parse(ID).unwrap(),
            "Buy the\nnew printer".into(),
            ActionKind::Approval,
            ts("Mon Jan 8 09:30:00 2024 +1000"),
            ts("Mon Jan 8 21:30:00 2024 +1000"),
        );
        assert!(matches!(result, Err(EntityError::InvalidContent { .. })));
    }

    #[test]
    fn test_ballot_slot_serde_tagging() {
        let slot = BallotSlot::Cast(Ballot::new(HexHash::parse(ID).unwrap(), "I approve"));
        let json = serde_json::to_string(&slot).unwrap();
        assert!(json.contains("\"slot\":\"cast\""));
        let back: BallotSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);

        let absent = serde_json::to_string(&BallotSlot::Absent).unwrap();
        assert_eq!(absent, "{\"slot\":\"absent\"}");
    }
}
