//! # Ballot Round
//!
//! Tracks one slot per expected recipient until every recipient has
//! answered or been marked absent, then closes into a Bundle.
//!
//! | Reply | Slot |
//! |-------|------|
//! | decodes, names this proposal, recognised answer | `Cast` (final) |
//! | does not decode | `Invalid` (a later valid reply replaces it) |
//! | sent at or after `expiresAt` | unchanged |
//! | names another proposal | unchanged |
//! | answer matches neither expected response | unchanged |

use crate::errors::{SessionError, SessionResult};
use ec_02_expiry_clock::is_stale;
use ec_03_codec::decode_ballot;
use ec_05_verdict_tally::{assemble_bundle, classify};
use shared_types::{BallotSlot, Bundle, OffsetTimestamp, Proposal};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// What a single reply did to the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Recorded,
    Invalid { reason: String },
    Stale,
    Foreign,
    Unrecognized { content: String },
    AlreadyCast,
    UnknownSender,
}

impl ReplyOutcome {
    /// True when the reply filled or changed a slot.
    pub fn changed_slot(&self) -> bool {
        matches!(self, ReplyOutcome::Recorded | ReplyOutcome::Invalid { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BallotRound {
    proposal: Proposal,
    /// Keyed by lowercased address; `None` while pending.
    slots: BTreeMap<String, Option<BallotSlot>>,
}

impl BallotRound {
    pub fn new<I, R>(proposal: Proposal, recipients: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let slots = recipients
            .into_iter()
            .map(|r| (key(r.as_ref()), None))
            .collect();
        Self { proposal, slots }
    }

    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    /// Apply one reply from `from`, sent at `sent_at`.
    pub fn record_reply(&mut self, from: &str, sent_at: &OffsetTimestamp, body: &str) -> ReplyOutcome {
        let outcome = self.apply_reply(from, sent_at, body);
        match &outcome {
            ReplyOutcome::Recorded => {
                info!("[ec-07] ballot from {} recorded for {}", from, self.proposal.id().short())
            }
            ReplyOutcome::Invalid { reason } => {
                warn!("[ec-07] invalid reply from {}: {}", from, reason)
            }
            other => debug!("[ec-07] reply from {} ignored: {:?}", from, other),
        }
        outcome
    }

    fn apply_reply(&mut self, from: &str, sent_at: &OffsetTimestamp, body: &str) -> ReplyOutcome {
        let expires_at = self.proposal.expires_at();
        let slot = match self.slots.get_mut(&key(from)) {
            Some(slot) => slot,
            None => return ReplyOutcome::UnknownSender,
        };
        if matches!(slot, Some(BallotSlot::Cast(_))) {
            return ReplyOutcome::AlreadyCast;
        }
        if is_stale(sent_at, &expires_at) {
            return ReplyOutcome::Stale;
        }

        let ballot = match decode_ballot(body) {
            Ok(ballot) => ballot,
            Err(e) => {
                let reason = e.to_string();
                *slot = Some(BallotSlot::Invalid {
                    reason: reason.clone(),
                });
                return ReplyOutcome::Invalid { reason };
            }
        };
        if &ballot.proposal_id != self.proposal.id() {
            return ReplyOutcome::Foreign;
        }
        let (yes, no) = self.proposal.expected_responses();
        if classify(&yes, &no, &ballot.content).is_err() {
            return ReplyOutcome::Unrecognized {
                content: ballot.content,
            };
        }

        *slot = Some(BallotSlot::Cast(ballot));
        ReplyOutcome::Recorded
    }

    /// Record that `recipient` will not answer. A cast ballot is kept.
    ///
    /// Returns whether the slot changed.
    pub fn mark_absent(&mut self, recipient: &str) -> SessionResult<bool> {
        let slot = self
            .slots
            .get_mut(&key(recipient))
            .ok_or_else(|| SessionError::UnknownRecipient(recipient.to_string()))?;
        match slot {
            Some(BallotSlot::Cast(_)) | Some(BallotSlot::Absent) => Ok(false),
            _ => {
                *slot = Some(BallotSlot::Absent);
                Ok(true)
            }
        }
    }

    /// Recipients with no slot yet.
    pub fn pending(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(recipient, _)| recipient.clone())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.values().all(Option::is_some)
    }

    pub fn slot(&self, recipient: &str) -> Option<&BallotSlot> {
        self.slots.get(&key(recipient)).and_then(Option::as_ref)
    }

    /// Tally the round into a Bundle. Every recipient must have a slot.
    pub fn close(self) -> SessionResult<Bundle> {
        let pending = self.pending();
        if !pending.is_empty() {
            return Err(SessionError::RoundIncomplete { pending });
        }
        let slots = self
            .slots
            .into_iter()
            .filter_map(|(recipient, slot)| slot.map(|slot| (recipient, slot)))
            .collect();
        let bundle = assemble_bundle(self.proposal, slots)?;
        info!(
            "[ec-07] round for {} closed: {}",
            bundle.proposal().id().short(),
            bundle.verdict()
        );
        Ok(bundle)
    }

    /// Once the Proposal has expired, mark everyone still pending absent and close.
    pub fn close_expired(mut self, now: &OffsetTimestamp) -> SessionResult<Bundle> {
        if !is_stale(now, &self.proposal.expires_at()) {
            return Err(SessionError::RoundIncomplete {
                pending: self.pending(),
            });
        }
        for slot in self.slots.values_mut().filter(|slot| slot.is_none()) {
            *slot = Some(BallotSlot::Absent);
        }
        self.close()
    }
}

fn key(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_01_identity::mint_proposal;
    use ec_03_codec::encode_ballot;
    use shared_types::{ActionKind, Ballot, BundleVerdict, HexHash};

    const RECIPIENTS: [&str; 5] = ["a@a.com", "b@b.com", "c@c.com", "d@d.com", "e@e.com"];

    fn ts(text: &str) -> OffsetTimestamp {
        OffsetTimestamp::parse(text).unwrap()
    }

    fn round() -> BallotRound {
        let proposal = mint_proposal(
            "Buy the new printer",
            ActionKind::Approval,
            ts("Mon Jan 8 09:30:00 2024 +1000"),
            ts("Mon Jan 8 21:30:00 2024 +1000"),
        )
        .unwrap();
        BallotRound::new(proposal, RECIPIENTS)
    }

    fn reply(round: &BallotRound, content: &str) -> String {
        encode_ballot(&Ballot::new(round.proposal().id().clone(), content))
    }

    fn early() -> OffsetTimestamp {
        ts("Mon Jan 8 10:00:00 2024 +1000")
    }

    #[test]
    fn test_four_of_five_accepts() {
        let mut round = round();
        for recipient in &RECIPIENTS[..4] {
            let body = reply(&round, "I approve");
            assert_eq!(round.record_reply(recipient, &early(), &body), ReplyOutcome::Recorded);
        }
        assert_eq!(round.pending(), vec!["e@e.com".to_string()]);
        assert!(round.mark_absent("e@e.com").unwrap());
        assert!(round.is_complete());

        let bundle = round.close().unwrap();
        assert_eq!(bundle.verdict(), BundleVerdict::Accepted);
    }

    #[test]
    fn test_close_refuses_pending_round() {
        let mut round = round();
        let body = reply(&round, "I approve");
        round.record_reply("a@a.com", &early(), &body);
        match round.close() {
            Err(SessionError::RoundIncomplete { pending }) => assert_eq!(pending.len(), 4),
            other => panic!("expected RoundIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_reply_ignored_across_offsets() {
        let mut round = round();
        let body = reply(&round, "I approve");
        // 11:30 UTC is exactly the expiry instant (21:30 +1000).
        let at_expiry = ts("Mon Jan 8 11:30:00 2024 +0000");
        assert_eq!(round.record_reply("a@a.com", &at_expiry, &body), ReplyOutcome::Stale);
        let just_before = ts("Mon Jan 8 06:29:59 2024 -0500");
        assert_eq!(round.record_reply("a@a.com", &just_before, &body), ReplyOutcome::Recorded);
    }

    #[test]
    fn test_invalid_reply_can_be_replaced() {
        let mut round = round();
        let outcome = round.record_reply("a@a.com", &early(), "I approve, thanks!");
        assert!(matches!(outcome, ReplyOutcome::Invalid { .. }));
        assert!(matches!(round.slot("a@a.com"), Some(BallotSlot::Invalid { .. })));

        let body = reply(&round, "I disapprove");
        assert_eq!(round.record_reply("A@A.com", &early(), &body), ReplyOutcome::Recorded);
        assert_eq!(round.record_reply("a@a.com", &early(), &body), ReplyOutcome::AlreadyCast);
    }

    #[test]
    fn test_foreign_unknown_and_unrecognized_leave_slot_pending() {
        let mut round = round();
        let foreign = encode_ballot(&Ballot::new(HexHash::from_bytes([9; 32]), "I approve"));
        assert_eq!(round.record_reply("a@a.com", &early(), &foreign), ReplyOutcome::Foreign);
        assert_eq!(
            round.record_reply("z@z.com", &early(), &reply(&round, "I approve")),
            ReplyOutcome::UnknownSender
        );
        let template = reply(&round, "I approve OR I disapprove");
        assert!(matches!(
            round.record_reply("a@a.com", &early(), &template),
            ReplyOutcome::Unrecognized { .. }
        ));
        assert_eq!(round.pending().len(), 5);
    }

    #[test]
    fn test_close_expired_marks_pending_absent() {
        let mut round = round();
        for recipient in &RECIPIENTS[..3] {
            let body = reply(&round, "I approve");
            round.record_reply(recipient, &early(), &body);
        }
        assert!(round.clone().close_expired(&early()).is_err());

        let bundle = round
            .close_expired(&ts("Tue Jan 9 09:00:00 2024 +1000"))
            .unwrap();
        assert_eq!(bundle.verdict(), BundleVerdict::Rejected);
        assert_eq!(
            bundle
                .ballots_by_recipient()
                .values()
                .filter(|slot| slot.is_absent())
                .count(),
            2
        );
    }

    #[test]
    fn test_mark_absent_unknown_recipient() {
        let mut round = round();
        assert!(matches!(
            round.mark_absent("z@z.com"),
            Err(SessionError::UnknownRecipient(_))
        ));
    }
}
