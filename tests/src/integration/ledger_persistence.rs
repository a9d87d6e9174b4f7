//! # Ledger Persistence
//!
//! The file-backed ledger across restarts, concurrent writers and
//! on-disk tampering.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ec_01_identity::mint_proposal;
    use ec_05_verdict_tally::assemble_bundle;
    use ec_06_ledger::{
        genesis_previous_hash, FileLedgerStore, Ledger, LedgerEntry, LedgerError,
    };
    use shared_types::{ActionKind, Ballot, BallotSlot, OffsetTimestamp, Proposal};
    use std::collections::BTreeMap;

    fn proposal(content: &str) -> Proposal {
        mint_proposal(
            content,
            ActionKind::Approval,
            OffsetTimestamp::parse("Mon Jan 8 09:30:00 2024 +1000").unwrap(),
            OffsetTimestamp::parse("Mon Jan 8 21:30:00 2024 +1000").unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_writers_never_fork_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Arc::new(Ledger::open(FileLedgerStore::new(&path)).unwrap());

        let tasks: Vec<_> = (0..16)
            .map(|n| {
                let ledger = Arc::clone(&ledger);
                tokio::task::spawn_blocking(move || {
                    ledger.append(LedgerEntry::Proposal(proposal(&format!("Proposal {}", n))))
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reopened = Ledger::open(FileLedgerStore::new(&path)).unwrap();
        assert_eq!(reopened.len(), 16);
        assert!(reopened.verify_chain());
        let blocks = reopened.blocks();
        assert_eq!(blocks[0].previous_hash, genesis_previous_hash());
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].own_hash);
        }
    }

    #[tokio::test]
    async fn test_racing_duplicate_appends_record_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(
            Ledger::open(FileLedgerStore::new(dir.path().join("ledger.json"))).unwrap(),
        );
        let p = proposal("Buy the new printer");

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let p = p.clone();
                tokio::task::spawn_blocking(move || ledger.append(LedgerEntry::Proposal(p)))
            })
            .collect();
        let mut recorded = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => recorded += 1,
                Err(LedgerError::DuplicateEntry { .. }) => {}
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!(recorded, 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_leftover_temp_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let ledger = Ledger::open(FileLedgerStore::new(&path)).unwrap();
            ledger
                .append(LedgerEntry::Proposal(proposal("Buy the new printer")))
                .unwrap();
        }
        // A crash between write and rename leaves only the temp file behind.
        std::fs::write(dir.path().join("ledger.tmp"), "[{\"index\": 7").unwrap();

        let ledger = Ledger::open(FileLedgerStore::new(&path)).unwrap();
        assert_eq!(ledger.len(), 1);
        ledger
            .append(LedgerEntry::Proposal(proposal("Hire an intern")))
            .unwrap();
        assert_eq!(Ledger::open(FileLedgerStore::new(&path)).unwrap().len(), 2);
    }

    #[test]
    fn test_tampered_ballot_in_stored_bundle_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let p = proposal("Buy the new printer");
        {
            let ledger = Ledger::open(FileLedgerStore::new(&path)).unwrap();
            ledger.append(LedgerEntry::Proposal(p.clone())).unwrap();
            let mut slots = BTreeMap::new();
            slots.insert(
                "ann@example.com".to_string(),
                BallotSlot::Cast(Ballot::new(p.id().clone(), "I disapprove")),
            );
            let bundle = assemble_bundle(p.clone(), slots).unwrap();
            ledger.append(LedgerEntry::Bundle(bundle)).unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replace("I disapprove", "I approve")).unwrap();
        assert!(matches!(
            Ledger::open(FileLedgerStore::new(&path)),
            Err(LedgerError::CorruptLedger { .. })
        ));
    }
}
