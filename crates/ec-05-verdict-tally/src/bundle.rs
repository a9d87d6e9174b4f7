//! Bundle assembly and audit.

use crate::errors::TallyError;
use crate::tally::tally;
use shared_types::{BallotSlot, Bundle, BundleVerdict, Proposal};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The verdict a Proposal's slots produce.
///
/// Any cast ballot naming a different proposal makes the result
/// indeterminate rather than an error.
pub fn recompute_verdict(
    proposal: &Proposal,
    slots: &BTreeMap<String, BallotSlot>,
) -> Result<BundleVerdict, TallyError> {
    let foreign = slots.iter().find_map(|(recipient, slot)| {
        slot.ballot()
            .filter(|ballot| &ballot.proposal_id != proposal.id())
            .map(|ballot| (recipient, ballot))
    });
    if let Some((recipient, ballot)) = foreign {
        warn!(
            "[ec-05] ballot from {} names {} instead of {}; bundle is indeterminate",
            recipient,
            ballot.proposal_id.short(),
            proposal.id().short()
        );
        return Ok(BundleVerdict::Indeterminate);
    }

    let (yes, no) = proposal.expected_responses();
    let outcome = tally(&yes, &no, slots.values())?;
    debug!(
        "[ec-05] {}: {}/{} yes -> {:?}",
        proposal.id().short(),
        outcome.yes,
        outcome.total,
        outcome.verdict
    );
    Ok(outcome.verdict.into())
}

/// Close a round: tally the slots and record the verdict in a Bundle.
pub fn assemble_bundle(
    proposal: Proposal,
    slots: BTreeMap<String, BallotSlot>,
) -> Result<Bundle, TallyError> {
    let verdict = recompute_verdict(&proposal, &slots)?;
    Ok(Bundle::new(proposal, slots, verdict))
}

/// Recompute a received Bundle's verdict from its own ballots and compare it
/// with the recorded one.
pub fn audit_bundle(bundle: &Bundle) -> Result<BundleVerdict, TallyError> {
    let recomputed = recompute_verdict(bundle.proposal(), bundle.ballots_by_recipient())?;
    if recomputed != bundle.verdict() {
        return Err(TallyError::VerdictMismatch {
            proposal_id: bundle.proposal().id().clone(),
            claimed: bundle.verdict(),
            recomputed,
        });
    }
    Ok(recomputed)
}
