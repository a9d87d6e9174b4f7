//! In-memory canonical store.
//!
//! Mirrors the remote contract's rules: one anchor per logical key, votes
//! only on open polls, and a 4/5 supermajority over registered voters at
//! finalization.

use crate::ports::{AnchorRecord, CanonicalStore, RemoteBundle};
use async_trait::async_trait;
use ec_04_consistency::{check, ConsistencyReport, ProposalTerms};
use ec_05_verdict_tally::{SUPERMAJORITY_DENOMINATOR, SUPERMAJORITY_NUMERATOR};
use parking_lot::RwLock;
use shared_types::{normalize_answer, ActionKind, HexHash, ProposalId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct Poll {
    voters: Vec<String>,
    votes: Vec<String>,
    accepted: Option<bool>,
}

#[derive(Debug, Default)]
struct StoreState {
    anchors: HashMap<HexHash, AnchorRecord>,
    polls: HashMap<ProposalId, Poll>,
}

#[derive(Debug, Default)]
pub struct InMemoryCanonicalStore {
    state: RwLock<StoreState>,
    unreachable: AtomicBool,
}

impl InMemoryCanonicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the store could not be reached.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Votes recorded so far for a Proposal.
    pub fn votes(&self, proposal_id: &ProposalId) -> Vec<String> {
        self.state
            .read()
            .polls
            .get(proposal_id)
            .map(|poll| poll.votes.clone())
            .unwrap_or_default()
    }

    /// Voters registered for a Proposal.
    pub fn voters(&self, proposal_id: &ProposalId) -> Vec<String> {
        self.state
            .read()
            .polls
            .get(proposal_id)
            .map(|poll| poll.voters.clone())
            .unwrap_or_default()
    }

    fn reachable(&self) -> Result<(), String> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err("canonical store unreachable".to_string())
        } else {
            Ok(())
        }
    }
}

fn is_yes(choice: &str) -> bool {
    ActionKind::ALL
        .iter()
        .any(|kind| normalize_answer(&kind.expected_responses().0) == choice)
}

#[async_trait]
impl CanonicalStore for InMemoryCanonicalStore {
    async fn exists(&self, key: &HexHash) -> Result<bool, String> {
        self.reachable()?;
        Ok(self.state.read().anchors.contains_key(key))
    }

    async fn anchored(&self, key: &HexHash) -> Result<Option<AnchorRecord>, String> {
        self.reachable()?;
        Ok(self.state.read().anchors.get(key).cloned())
    }

    async fn create(&self, record: AnchorRecord) -> Result<(), String> {
        self.reachable()?;
        let mut state = self.state.write();
        if state.anchors.contains_key(&record.key) {
            return Err(format!("key {} already anchored", record.key.short()));
        }
        state.polls.entry(record.proposal_id.clone()).or_default();
        state.anchors.insert(record.key.clone(), record);
        Ok(())
    }

    async fn register_voter(
        &self,
        proposal_id: &ProposalId,
        recipient: &str,
    ) -> Result<(), String> {
        self.reachable()?;
        let mut state = self.state.write();
        let poll = state
            .polls
            .get_mut(proposal_id)
            .ok_or_else(|| format!("no proposal {}", proposal_id.short()))?;
        if !poll.voters.iter().any(|v| v.eq_ignore_ascii_case(recipient)) {
            poll.voters.push(recipient.to_string());
        }
        Ok(())
    }

    async fn vote(&self, proposal_id: &ProposalId, choice: &str) -> Result<(), String> {
        self.reachable()?;
        let mut state = self.state.write();
        let poll = state
            .polls
            .get_mut(proposal_id)
            .ok_or_else(|| format!("no proposal {}", proposal_id.short()))?;
        if poll.accepted.is_some() {
            return Err(format!("proposal {} is finalized", proposal_id.short()));
        }
        if poll.votes.len() >= poll.voters.len() {
            return Err(format!("all voters of {} have voted", proposal_id.short()));
        }
        poll.votes.push(normalize_answer(choice));
        Ok(())
    }

    async fn check_consistency(
        &self,
        key: &HexHash,
        terms: &ProposalTerms,
    ) -> Result<ConsistencyReport, String> {
        self.reachable()?;
        let state = self.state.read();
        let anchor = state
            .anchors
            .get(key)
            .ok_or_else(|| format!("nothing anchored under {}", key.short()))?;
        Ok(check(terms, &anchor.terms()))
    }

    async fn consensus_finalize(&self, proposal_id: &ProposalId) -> Result<(), String> {
        self.reachable()?;
        let mut state = self.state.write();
        let poll = state
            .polls
            .get_mut(proposal_id)
            .ok_or_else(|| format!("no proposal {}", proposal_id.short()))?;
        if poll.accepted.is_none() {
            let yes = poll.votes.iter().filter(|choice| is_yes(choice)).count();
            let total = poll.voters.len();
            poll.accepted =
                Some(total > 0 && yes * SUPERMAJORITY_DENOMINATOR >= total * SUPERMAJORITY_NUMERATOR);
        }
        Ok(())
    }

    async fn is_finalized(&self, proposal_id: &ProposalId) -> Result<bool, String> {
        self.reachable()?;
        Ok(self
            .state
            .read()
            .polls
            .get(proposal_id)
            .map_or(false, |poll| poll.accepted.is_some()))
    }

    async fn fetch_bundle(&self, proposal_id: &ProposalId) -> Result<RemoteBundle, String> {
        self.reachable()?;
        let state = self.state.read();
        let poll = state
            .polls
            .get(proposal_id)
            .ok_or_else(|| format!("no proposal {}", proposal_id.short()))?;
        let accepted = poll
            .accepted
            .ok_or_else(|| format!("proposal {} is not finalized", proposal_id.short()))?;
        Ok(RemoteBundle {
            accepted,
            proposal_id: proposal_id.clone(),
            vote_count: poll.votes.len(),
            voters: poll.voters.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{BusinessRequirement, OffsetTimestamp};

    fn record(key: &str) -> AnchorRecord {
        AnchorRecord {
            key: HexHash::from_bytes([key.as_bytes()[0]; 32]),
            proposal_id: HexHash::from_bytes([7; 32]),
            window: "Mon Jan 8 09:30:00 2024 +1000 +12h".to_string(),
            expires_at: OffsetTimestamp::parse("Mon Jan 8 21:30:00 2024 +1000").unwrap(),
            business_requirement: BusinessRequirement::new(50).unwrap(),
            content_hash: HexHash::from_bytes([1; 32]),
        }
    }

    #[tokio::test]
    async fn test_create_is_once_per_key() {
        let store = InMemoryCanonicalStore::new();
        store.create(record("a")).await.unwrap();
        assert!(store.exists(&record("a").key).await.unwrap());
        assert!(store.create(record("a")).await.is_err());
    }

    #[tokio::test]
    async fn test_finalize_uses_registered_voters_as_denominator() {
        let store = InMemoryCanonicalStore::new();
        let anchor = record("a");
        let id = anchor.proposal_id.clone();
        store.create(anchor).await.unwrap();
        for voter in ["a@a.com", "b@b.com", "c@c.com", "d@d.com", "e@e.com"] {
            store.register_voter(&id, voter).await.unwrap();
        }
        for _ in 0..4 {
            store.vote(&id, "I Approve").await.unwrap();
        }

        assert!(store.fetch_bundle(&id).await.is_err());
        store.consensus_finalize(&id).await.unwrap();
        let bundle = store.fetch_bundle(&id).await.unwrap();
        assert!(bundle.accepted);
        assert_eq!(bundle.vote_count, 4);
        assert_eq!(bundle.voters.len(), 5);
        assert!(store.vote(&id, "i approve").await.is_err());
    }

    #[tokio::test]
    async fn test_check_consistency_against_anchor() {
        let store = InMemoryCanonicalStore::new();
        let anchor = record("a");
        store.create(anchor.clone()).await.unwrap();

        let mut terms = anchor.terms();
        assert!(store
            .check_consistency(&anchor.key, &terms)
            .await
            .unwrap()
            .is_consistent());

        terms.business_requirement = BusinessRequirement::new(60).unwrap();
        let report = store.check_consistency(&anchor.key, &terms).await.unwrap();
        assert!(!report.business_requirement_matches);
        assert!(report.content_matches && report.expiry_matches);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_every_call() {
        let store = InMemoryCanonicalStore::new();
        store.set_unreachable(true);
        assert!(store.exists(&record("a").key).await.is_err());
    }
}
