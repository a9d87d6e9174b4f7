//! BUNDLE blocks.

use crate::errors::{CodecError, CodecResult, DecodeError};
use crate::scanner::{field_line, find_block, normalize, parse_id, scan_fields};
use shared_types::wire::{ACTION_REQUESTED, RECIPIENTS, REQUEST_CONTENTS, REQUEST_ID, RESPONSES, VERDICT};
use shared_types::{ActionKind, Ballot, BallotSlot, BlockKind, Bundle, BundleVerdict, ProposalId};
use std::collections::BTreeMap;
use tracing::debug;

/// Response text written for a recipient who never answered.
pub const ABSENT_RESPONSE: &str = "No response";

/// Response text written for a reply that did not decode.
pub const INVALID_RESPONSE: &str = "Invalid response";

/// The fields of a BUNDLE block, before they are checked against the ledger.
///
/// The wire form carries no timestamps, so a full [`Bundle`] can only be
/// rebuilt once the anchored Proposal is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBundle {
    pub proposal_id: ProposalId,
    pub content: String,
    pub action: ActionKind,
    pub slots: BTreeMap<String, BallotSlot>,
    pub claimed_verdict: BundleVerdict,
}

/// Render a Bundle. Indeterminate bundles have no wire form.
pub fn encode_bundle(bundle: &Bundle) -> CodecResult<String> {
    let proposal = bundle.proposal();
    let verdict = bundle
        .verdict()
        .wire_keyword()
        .ok_or_else(|| CodecError::IndeterminateBundle {
            proposal_id: proposal.id().clone(),
        })?;

    let recipients = bundle
        .recipients()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let responses = bundle
        .ballots_by_recipient()
        .values()
        .map(|slot| match slot {
            BallotSlot::Cast(ballot) => ballot.content.as_str(),
            BallotSlot::Invalid { .. } => INVALID_RESPONSE,
            BallotSlot::Absent => ABSENT_RESPONSE,
        })
        .collect::<Vec<_>>()
        .join(", ");

    let kind = BlockKind::Bundle;
    let mut out = [
        kind.start_marker(),
        field_line(REQUEST_ID, proposal.id().as_str()),
        field_line(REQUEST_CONTENTS, proposal.content()),
        field_line(ACTION_REQUESTED, proposal.action().name()),
        field_line(RECIPIENTS, &recipients),
        field_line(RESPONSES, &responses),
        field_line(VERDICT, verdict),
        kind.end_marker(),
    ]
    .join("\n");
    out.push('\n');
    Ok(out)
}

/// Decode the first BUNDLE block in `text`.
pub fn decode_bundle(text: &str) -> Result<WireBundle, DecodeError> {
    let kind = BlockKind::Bundle;
    let normalized = normalize(text);
    let body = find_block(&normalized, kind)?;
    let [id, content, action, recipients, responses, verdict] = scan_fields(
        body,
        kind,
        [
            REQUEST_ID,
            REQUEST_CONTENTS,
            ACTION_REQUESTED,
            RECIPIENTS,
            RESPONSES,
            VERDICT,
        ],
    )?;

    let proposal_id = parse_id(REQUEST_ID, id)?;
    let action: ActionKind = action
        .parse()
        .map_err(|_| DecodeError::UnknownAction(action.to_string()))?;
    let claimed_verdict = match verdict.to_ascii_uppercase().as_str() {
        "ACCEPTED" => BundleVerdict::Accepted,
        "REJECTED" => BundleVerdict::Rejected,
        _ => return Err(DecodeError::UnrecognizedVerdict(verdict.to_string())),
    };

    let recipients = split_list(recipients);
    let responses = split_list(responses);
    if recipients.len() != responses.len() {
        debug!(
            "[ec-03] bundle {}: {} recipients, {} responses",
            proposal_id.short(),
            recipients.len(),
            responses.len()
        );
        return Err(DecodeError::CountMismatch {
            recipients: recipients.len(),
            responses: responses.len(),
        });
    }

    let mut slots = BTreeMap::new();
    for (recipient, response) in recipients.into_iter().zip(responses) {
        let slot = if response.eq_ignore_ascii_case(ABSENT_RESPONSE) {
            BallotSlot::Absent
        } else if response.eq_ignore_ascii_case(INVALID_RESPONSE) {
            BallotSlot::Invalid {
                reason: INVALID_RESPONSE.to_string(),
            }
        } else {
            BallotSlot::Cast(Ballot::new(proposal_id.clone(), response))
        };
        if slots.insert(recipient.to_string(), slot).is_some() {
            return Err(DecodeError::DuplicateRecipient(recipient.to_string()));
        }
    }

    Ok(WireBundle {
        proposal_id,
        content: content.to_string(),
        action,
        slots,
        claimed_verdict,
    })
}

/// Comma-separated items, each trimmed. Reflowing may have moved the space.
fn split_list(field: &str) -> Vec<&str> {
    field.split(',').map(str::trim).collect()
}
