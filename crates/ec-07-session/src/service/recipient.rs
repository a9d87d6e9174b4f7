//! Recipient workflow: read a Proposal, draft and cast a Ballot.

use crate::errors::{SessionError, SessionResult};
use crate::ports::{CanonicalStore, MailTransport};
use ec_03_codec::{decode_ballot, decode_proposal, encode_ballot};
use ec_05_verdict_tally::classify;
use shared_types::{normalize_answer, ActionKind, Ballot, Choice, Proposal};
use std::sync::Arc;
use tracing::info;

pub struct RecipientSession<C: CanonicalStore, M: MailTransport> {
    address: String,
    store: Arc<C>,
    mail: Arc<M>,
}

impl<C: CanonicalStore, M: MailTransport> RecipientSession<C, M> {
    pub fn new(address: impl Into<String>, store: Arc<C>, mail: Arc<M>) -> Self {
        Self {
            address: address.into(),
            store,
            mail,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Decode and verify a received Proposal.
    pub fn read_proposal(&self, text: &str) -> SessionResult<Proposal> {
        Ok(decode_proposal(text)?)
    }

    /// The RESPONSE block answering `proposal` with `choice`.
    pub fn draft_ballot(&self, proposal: &Proposal, choice: Choice) -> String {
        encode_ballot(&Ballot::new(
            proposal.id().clone(),
            proposal.action().response_for(choice),
        ))
    }

    /// Vote with the Ballot in `text` and mail it to the leader.
    ///
    /// The answer must be one of a supported action's responses.
    pub async fn cast_ballot(&self, text: &str, leader: &str, subject: &str) -> SessionResult<Ballot> {
        let ballot = decode_ballot(text)?;
        let recognised = ActionKind::ALL.iter().any(|kind| {
            let (yes, no) = kind.expected_responses();
            classify(&yes, &no, &ballot.content).is_ok()
        });
        if !recognised {
            return Err(SessionError::UnrecognizedBallot(ballot.content));
        }

        self.store
            .vote(&ballot.proposal_id, &normalize_answer(&ballot.content))
            .await
            .map_err(SessionError::Store)?;
        self.mail
            .send(leader, subject, &encode_ballot(&ballot))
            .await
            .map_err(SessionError::Transport)?;

        info!(
            "[ec-07] {} voted on {}",
            self.address,
            ballot.proposal_id.short()
        );
        Ok(ballot)
    }
}
