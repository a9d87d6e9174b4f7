//! # Leader Round Flow
//!
//! A leader proposes over mail, recipients answer through their own
//! sessions, and the leader commits the Bundle to a file-backed ledger.
//! Any party holding the ledger can then audit the Bundle from mail text.
//!
//! ## Flow Tested:
//!
//! 1. **Propose**: identity (ec-01), window (ec-02), encode (ec-03), anchor (ec-06)
//! 2. **Vote**: decode (ec-03), remote vote, reply mail
//! 3. **Close**: stale filtering (ec-02), tally (ec-05)
//! 4. **Commit and audit**: ledger (ec-06), reconstruct + re-tally (ec-05)

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ec_02_expiry_clock::{ExpiryClock, FixedTimeSource};
    use ec_04_consistency::{ConsistencyError, Term};
    use ec_06_ledger::{EntryKind, FileLedgerStore, Ledger};
    use ec_07_session::{
        reconstruct_bundle, InMemoryCanonicalStore, InMemoryMailTransport, InboundMail,
        LeaderDependencies, LeaderSession, ProposalDraft, RecipientSession, SessionConfig,
        SessionError,
    };
    use shared_types::{BallotSlot, BusinessRequirement, BundleVerdict, Choice, OffsetTimestamp};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const LEADER: &str = "leader@example.com";
    const SUBJECT: &str = "Budget vote";
    const RECIPIENTS: [&str; 5] = [
        "ann@example.com",
        "bob@example.com",
        "cat@example.com",
        "dan@example.com",
        "eve@example.com",
    ];

    type Leader =
        LeaderSession<InMemoryCanonicalStore, InMemoryMailTransport, FileLedgerStore, FixedTimeSource>;

    fn ts(text: &str) -> OffsetTimestamp {
        OffsetTimestamp::parse(text).unwrap()
    }

    fn leader(
        store: &Arc<InMemoryCanonicalStore>,
        mail: &Arc<InMemoryMailTransport>,
        ledger: &Arc<Ledger<FileLedgerStore>>,
        at: &str,
    ) -> Leader {
        LeaderSession::new(LeaderDependencies {
            config: SessionConfig {
                leader_address: LEADER.to_string(),
                ..SessionConfig::default()
            },
            store: Arc::clone(store),
            mail: Arc::clone(mail),
            ledger: Arc::clone(ledger),
            clock: ExpiryClock::new(FixedTimeSource::at(ts(at))),
        })
    }

    fn draft(content: &str, business: u32) -> ProposalDraft {
        ProposalDraft::new(
            SUBJECT,
            content,
            RECIPIENTS.iter().map(|r| r.to_string()).collect(),
            "12h".parse().unwrap(),
            BusinessRequirement::new(business).unwrap(),
        )
    }

    /// Recipients answer from their inboxes; replies land in the leader's inbox.
    async fn answer(
        store: &Arc<InMemoryCanonicalStore>,
        mail: &Arc<InMemoryMailTransport>,
        answers: &[(&str, Choice, &str)],
    ) {
        for (recipient, choice, sent_at) in answers {
            let outbox = Arc::new(InMemoryMailTransport::new());
            let session = RecipientSession::new(*recipient, Arc::clone(store), Arc::clone(&outbox));
            let inbox = mail.sent_to(recipient);
            let proposal = session.read_proposal(&inbox[0].body).unwrap();
            let ballot = session.draft_ballot(&proposal, *choice);
            session.cast_ballot(&ballot, LEADER, SUBJECT).await.unwrap();

            for sent in outbox.sent() {
                mail.deliver(InboundMail {
                    from: recipient.to_string(),
                    subject: sent.subject,
                    sent_at: ts(sent_at),
                    body: sent.body,
                });
            }
        }
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_round_commits_and_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = Arc::new(InMemoryCanonicalStore::new());
        let mail = Arc::new(InMemoryMailTransport::new());
        let ledger = Arc::new(Ledger::open(FileLedgerStore::new(&path)).unwrap());
        let session = leader(&store, &mail, &ledger, "Mon Jan 8 09:30:00 2024 +1000");

        let mut round = session
            .propose(&draft("Buy the new printer", 50))
            .await
            .unwrap();
        let id = round.proposal().id().clone();

        // A reply from a recipient in another zone, inside the window, and a
        // reply at the expiry instant that must not count.
        answer(
            &store,
            &mail,
            &[
                ("ann@example.com", Choice::Yes, "Mon Jan 8 10:00:00 2024 +1000"),
                ("bob@example.com", Choice::Yes, "Sun Jan 7 19:00:00 2024 -0500"),
                ("cat@example.com", Choice::Yes, "Mon Jan 8 12:00:00 2024 +1000"),
                ("dan@example.com", Choice::Yes, "Mon Jan 8 13:00:00 2024 +1000"),
                ("eve@example.com", Choice::No, "Mon Jan 8 11:30:00 2024 +0000"),
            ],
        )
        .await;
        session.collect_ballots(&mut round, SUBJECT).await.unwrap();
        assert_eq!(round.pending(), vec!["eve@example.com".to_string()]);

        let bundle = round
            .close_expired(&ts("Tue Jan 9 08:00:00 2024 +1000"))
            .unwrap();
        assert_eq!(bundle.verdict(), BundleVerdict::Accepted);
        assert_eq!(
            bundle.ballots_by_recipient().get("eve@example.com"),
            Some(&BallotSlot::Absent)
        );
        session.commit_bundle(&bundle, SUBJECT).await.unwrap();
        drop(session);
        drop(ledger);

        let reopened = Ledger::open(FileLedgerStore::new(&path)).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.verify_chain());
        assert!(reopened.contains(EntryKind::Bundle, &id));

        let bundle_mail = mail.sent_to("ann@example.com").pop().unwrap().body;
        let audited = reconstruct_bundle(&bundle_mail, &reopened).unwrap();
        assert_eq!(audited.verdict(), BundleVerdict::Accepted);
    }

    #[tokio::test]
    async fn test_second_leader_process_resumes_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryCanonicalStore::new());
        let mail = Arc::new(InMemoryMailTransport::new());

        let first_ledger = Arc::new(
            Ledger::open(FileLedgerStore::new(dir.path().join("first.json"))).unwrap(),
        );
        let first = leader(&store, &mail, &first_ledger, "Mon Jan 8 09:30:00 2024 +1000");
        let original = first
            .propose(&draft("Buy the new printer", 50))
            .await
            .unwrap();

        // Another machine, later, same leader and subject, fresh ledger.
        let second_ledger = Arc::new(
            Ledger::open(FileLedgerStore::new(dir.path().join("second.json"))).unwrap(),
        );
        let second = leader(&store, &mail, &second_ledger, "Mon Jan 8 15:00:00 2024 +1000");
        let resumed = second
            .propose(&draft("Buy  the new\nprinter", 50))
            .await
            .unwrap();

        assert_eq!(resumed.proposal(), original.proposal());
        assert!(second_ledger.contains(EntryKind::Proposal, original.proposal().id()));

        let drifted = second.propose(&draft("Buy the new printer", 75)).await;
        match drifted {
            Err(SessionError::Consistency(ConsistencyError::Mismatch { drifted })) => {
                assert_eq!(drifted, vec![Term::BusinessRequirement])
            }
            other => panic!("expected business requirement drift, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remote_and_local_verdicts_agree() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryCanonicalStore::new());
        let mail = Arc::new(InMemoryMailTransport::new());
        let ledger = Arc::new(
            Ledger::open(FileLedgerStore::new(dir.path().join("ledger.json"))).unwrap(),
        );
        let session = leader(&store, &mail, &ledger, "Mon Jan 8 09:30:00 2024 +1000");

        let mut round = session
            .propose(&draft("Hire a second designer", 50))
            .await
            .unwrap();
        let id = round.proposal().id().clone();
        let at = "Mon Jan 8 10:00:00 2024 +1000";
        answer(
            &store,
            &mail,
            &[
                ("ann@example.com", Choice::Yes, at),
                ("bob@example.com", Choice::Yes, at),
                ("cat@example.com", Choice::Yes, at),
                ("dan@example.com", Choice::No, at),
                ("eve@example.com", Choice::No, at),
            ],
        )
        .await;
        session.collect_ballots(&mut round, SUBJECT).await.unwrap();
        let local = round.close().unwrap();
        let remote = session.retrieve_bundle(&id).await.unwrap();

        assert_eq!(local.verdict(), BundleVerdict::Rejected);
        assert!(!remote.accepted);
        assert_eq!(remote.vote_count, 5);
    }
}
