//! Ballot classification and the supermajority rule.

use crate::errors::TallyError;
use shared_types::{normalize_answer, BallotSlot, BundleVerdict};
use tracing::debug;

/// Required yes share, as a fraction: 4/5.
pub const SUPERMAJORITY_NUMERATOR: usize = 4;
pub const SUPERMAJORITY_DENOMINATOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl From<Verdict> for BundleVerdict {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => BundleVerdict::Accepted,
            Verdict::Reject => BundleVerdict::Rejected,
        }
    }
}

/// Outcome of a tally, with its counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub yes: usize,
    pub total: usize,
    pub verdict: Verdict,
}

impl Tally {
    pub fn no(&self) -> usize {
        self.total - self.yes
    }
}

/// Whether `content` is the yes answer (`true`) or the no answer (`false`).
///
/// Comparison ignores case and whitespace runs.
pub fn classify(expected_yes: &str, expected_no: &str, content: &str) -> Result<bool, TallyError> {
    let answer = normalize_answer(content);
    if answer == normalize_answer(expected_yes) {
        Ok(true)
    } else if answer == normalize_answer(expected_no) {
        Ok(false)
    } else {
        debug!("[ec-05] unrecognized ballot content {:?}", content);
        Err(TallyError::UnrecognizedBallotContent {
            content: content.to_string(),
            expected_yes: expected_yes.to_string(),
            expected_no: expected_no.to_string(),
        })
    }
}

/// Tally one slot per expected recipient.
pub fn tally<'a, I>(expected_yes: &str, expected_no: &str, slots: I) -> Result<Tally, TallyError>
where
    I: IntoIterator<Item = &'a BallotSlot>,
{
    let mut yes = 0usize;
    let mut total = 0usize;
    for slot in slots {
        total += 1;
        if let BallotSlot::Cast(ballot) = slot {
            if classify(expected_yes, expected_no, &ballot.content)? {
                yes += 1;
            }
        }
    }

    if total == 0 {
        return Err(TallyError::NoBallots);
    }

    let verdict = if yes * SUPERMAJORITY_DENOMINATOR >= total * SUPERMAJORITY_NUMERATOR {
        Verdict::Accept
    } else {
        Verdict::Reject
    };
    Ok(Tally {
        yes,
        total,
        verdict,
    })
}
