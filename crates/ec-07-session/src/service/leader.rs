//! Leader workflow: anchor a Proposal, collect ballots, commit the Bundle.

use crate::config::SessionConfig;
use crate::domain::{BallotRound, ProposalDraft, ReplyOutcome};
use crate::errors::{SessionError, SessionResult};
use crate::ports::{AnchorRecord, CanonicalStore, MailFilter, MailTransport, RemoteBundle};
use crate::service::audit::retrieve_remote_bundle;
use ec_01_identity::{content_hash, logical_key, mint_proposal, restore_proposal};
use ec_02_expiry_clock::{reconstruct_window, ExpiryClock, ExpiryWindow, TimeSource};
use ec_03_codec::{encode_bundle, encode_proposal};
use ec_04_consistency::{check, ProposalTerms};
use ec_06_ledger::{BlockRef, EntryKind, Ledger, LedgerEntry, LedgerError, LedgerStore};
use shared_types::{Bundle, HexHash, OffsetTimestamp, Proposal, ProposalId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies for LeaderSession
pub struct LeaderDependencies<C, M, S, T>
where
    S: LedgerStore,
    T: TimeSource,
{
    pub config: SessionConfig,
    pub store: Arc<C>,
    pub mail: Arc<M>,
    pub ledger: Arc<Ledger<S>>,
    pub clock: ExpiryClock<T>,
}

pub struct LeaderSession<C, M, S, T>
where
    C: CanonicalStore,
    M: MailTransport,
    S: LedgerStore,
    T: TimeSource,
{
    config: SessionConfig,
    store: Arc<C>,
    mail: Arc<M>,
    ledger: Arc<Ledger<S>>,
    clock: ExpiryClock<T>,
}

impl<C, M, S, T> LeaderSession<C, M, S, T>
where
    C: CanonicalStore,
    M: MailTransport,
    S: LedgerStore,
    T: TimeSource,
{
    pub fn new(deps: LeaderDependencies<C, M, S, T>) -> Self {
        Self {
            config: deps.config,
            store: deps.store,
            mail: deps.mail,
            ledger: deps.ledger,
            clock: deps.clock,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    /// Anchor `draft` and send it to every recipient.
    ///
    /// A draft whose logical key is already anchored remotely is checked
    /// against the anchored terms; any drift fails with `ConsistencyMismatch`
    /// naming the drifted terms. Otherwise the anchored Proposal is rebuilt
    /// from its compact window and sent again.
    pub async fn propose(&self, draft: &ProposalDraft) -> SessionResult<BallotRound> {
        let leader = self.config.require_leader()?;
        let content = draft.validate(self.config.min_content_len)?;
        let key = logical_key(leader, &draft.subject);
        debug!("[ec-07] proposing under key {}", key.short());

        let proposal = if self.store.exists(&key).await.map_err(SessionError::Store)? {
            let anchor = self
                .store
                .anchored(&key)
                .await
                .map_err(SessionError::Store)?
                .ok_or_else(|| {
                    SessionError::Store(format!(
                        "key {} exists but has no anchored record",
                        key.short()
                    ))
                })?;
            self.resume_anchored(&key, anchor, content, draft).await?
        } else {
            self.anchor_new(&key, &content, draft).await?
        };

        for recipient in draft.recipient_addresses() {
            self.store
                .register_voter(proposal.id(), recipient)
                .await
                .map_err(SessionError::Store)?;
        }
        let body = encode_proposal(&proposal);
        for recipient in draft.recipient_addresses() {
            self.mail
                .send(recipient, &draft.subject, &body)
                .await
                .map_err(SessionError::Transport)?;
        }
        info!(
            "[ec-07] proposal {} sent to {} recipients",
            proposal.id().short(),
            draft.recipients.len()
        );

        Ok(BallotRound::new(proposal, draft.recipient_addresses()))
    }

    async fn anchor_new(
        &self,
        key: &HexHash,
        content: &str,
        draft: &ProposalDraft,
    ) -> SessionResult<Proposal> {
        let window = self.clock.open_window(draft.expiry)?;
        let proposal = mint_proposal(
            content,
            draft.action,
            window.created_at(),
            window.expires_at(),
        )?;

        self.store
            .create(AnchorRecord {
                key: key.clone(),
                proposal_id: proposal.id().clone(),
                window: window.to_compact(),
                expires_at: window.expires_at(),
                business_requirement: draft.business_requirement,
                content_hash: content_hash(proposal.content()),
            })
            .await
            .map_err(SessionError::Store)?;
        self.anchor_locally(&proposal)?;

        info!("[ec-07] anchored new proposal {}", proposal.id().short());
        Ok(proposal)
    }

    async fn resume_anchored(
        &self,
        key: &HexHash,
        anchor: AnchorRecord,
        content: String,
        draft: &ProposalDraft,
    ) -> SessionResult<Proposal> {
        info!(
            "[ec-07] key {} already anchored as {}",
            key.short(),
            anchor.proposal_id.short()
        );
        let anchored_window = reconstruct_window(&anchor.window)?;
        let local_window = ExpiryWindow::starting_at(anchored_window.created_at(), draft.expiry)?;
        let local = ProposalTerms::new(
            content_hash(&content),
            local_window.expires_at(),
            draft.business_requirement,
        );

        let remote = self
            .store
            .check_consistency(key, &local)
            .await
            .map_err(SessionError::Store)?;
        let report = check(&local, &anchor.terms()).combine(remote);
        if !report.is_consistent() {
            warn!(
                "[ec-07] draft drifted from anchored proposal {}: {:?}",
                anchor.proposal_id.short(),
                report.drifted()
            );
        }
        report.into_result()?;

        let proposal = restore_proposal(
            anchor.proposal_id,
            content,
            draft.action,
            anchored_window.created_at(),
            anchored_window.expires_at(),
        )?;
        self.anchor_locally(&proposal)?;
        Ok(proposal)
    }

    fn anchor_locally(&self, proposal: &Proposal) -> SessionResult<()> {
        match self.ledger.append(LedgerEntry::Proposal(proposal.clone())) {
            Ok(_) => Ok(()),
            Err(LedgerError::DuplicateEntry { .. }) => {
                debug!("[ec-07] {} already in ledger", proposal.id().short());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Feed every reply under `subject` into the round.
    pub async fn collect_ballots(
        &self,
        round: &mut BallotRound,
        subject: &str,
    ) -> SessionResult<Vec<(String, ReplyOutcome)>> {
        let replies = self
            .mail
            .receive(&MailFilter::subject(subject))
            .await
            .map_err(SessionError::Transport)?;

        let outcomes = replies
            .into_iter()
            .map(|mail| {
                let outcome = round.record_reply(&mail.from, &mail.sent_at, &mail.body);
                (mail.from, outcome)
            })
            .collect();
        Ok(outcomes)
    }

    /// Anchor the Bundle in the ledger, then share it with its recipients.
    pub async fn commit_bundle(&self, bundle: &Bundle, subject: &str) -> SessionResult<BlockRef> {
        let body = encode_bundle(bundle)?;
        let block = self.ledger.append(LedgerEntry::Bundle(bundle.clone()))?;
        for recipient in bundle.recipients() {
            self.mail
                .send(recipient, subject, &body)
                .await
                .map_err(SessionError::Transport)?;
        }
        info!(
            "[ec-07] bundle for {} committed at block {}",
            bundle.proposal().id().short(),
            block.index
        );
        Ok(block)
    }

    pub fn is_committed(&self, proposal_id: &ProposalId) -> bool {
        self.ledger.contains(EntryKind::Bundle, proposal_id)
    }

    /// The canonical store's own verdict for a Proposal.
    pub async fn retrieve_bundle(&self, proposal_id: &ProposalId) -> SessionResult<RemoteBundle> {
        retrieve_remote_bundle(self.store.as_ref(), proposal_id).await
    }

    /// Current time as the session's clock renders it.
    pub fn now(&self) -> OffsetTimestamp {
        self.clock.now()
    }
}
