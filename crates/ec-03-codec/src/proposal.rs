//! REQUEST blocks.

use crate::ballot::encode_ballot_template;
use crate::errors::{CodecResult, DecodeError};
use crate::scanner::{field_line, find_block, normalize, parse_id, parse_timestamp, scan_fields};
use ec_01_identity::restore_proposal;
use shared_types::wire::{ACTION_REQUESTED, EXPIRY_DATE, MESSAGE_CONTENTS, MESSAGE_DATE, MESSAGE_ID};
use shared_types::{ActionKind, BlockKind, Proposal};
use tracing::debug;

const REPLY_INSTRUCTIONS: &str = "Please reply with a copy of the \"BLOCKCHAIN RESPONSE\" below.";

/// Render a Proposal as a REQUEST block followed by a pre-filled RESPONSE
/// template for the recipient to edit.
pub fn encode_proposal(proposal: &Proposal) -> String {
    let (yes, no) = proposal.expected_responses();
    let kind = BlockKind::Request;
    let request = [
        kind.start_marker(),
        field_line(MESSAGE_DATE, &proposal.created_at().to_string()),
        field_line(EXPIRY_DATE, &proposal.expires_at().to_string()),
        field_line(MESSAGE_ID, proposal.id().as_str()),
        field_line(MESSAGE_CONTENTS, proposal.content()),
        field_line(ACTION_REQUESTED, REPLY_INSTRUCTIONS),
        format!(
            "# Edit the MESSAGE RESPONSE field to say \"{}\" if YES, or \"{}\" if NO to the proposal.",
            yes, no
        ),
        kind.end_marker(),
    ]
    .join("\n");

    format!("{}\n\n{}", request, encode_ballot_template(proposal))
}

/// Decode the first REQUEST block in `text`.
///
/// The action is re-derived from the quoted YES/NO answers in the
/// instructions, and the id must recompute from the decoded content and
/// creation timestamp.
pub fn decode_proposal(text: &str) -> CodecResult<Proposal> {
    let kind = BlockKind::Request;
    let normalized = normalize(text);
    let body = find_block(&normalized, kind)?;
    let [date, expiry, id, content, action] = scan_fields(
        body,
        kind,
        [
            MESSAGE_DATE,
            EXPIRY_DATE,
            MESSAGE_ID,
            MESSAGE_CONTENTS,
            ACTION_REQUESTED,
        ],
    )?;

    let created_at = parse_timestamp(MESSAGE_DATE, date)?;
    let expires_at = parse_timestamp(EXPIRY_DATE, expiry)?;
    let claimed = parse_id(MESSAGE_ID, id)?;
    let action = derive_action(action)?;

    let proposal = restore_proposal(claimed, content.to_string(), action, created_at, expires_at)
        .inspect_err(|e| debug!("[ec-03] proposal rejected: {}", e))?;
    Ok(proposal)
}

/// Find the answers quoted before `if YES` and `if NO` and map the pair to
/// an action kind.
fn derive_action(instructions: &str) -> Result<ActionKind, DecodeError> {
    let segments: Vec<&str> = instructions.split('"').collect();
    let mut yes = None;
    let mut no = None;

    // Quoted text sits at odd indices; the segment after it says which answer it is.
    for index in (1..segments.len()).step_by(2) {
        let trailing = segments.get(index + 1).map(|s| s.trim_start()).unwrap_or("");
        if trailing.starts_with("if YES") {
            yes = Some(segments[index]);
        } else if trailing.starts_with("if NO") {
            no = Some(segments[index]);
        }
    }

    let (yes, no) = match (yes, no) {
        (Some(yes), Some(no)) => (yes, no),
        _ => return Err(DecodeError::MissingActionInstructions),
    };
    ActionKind::from_expected_pair(yes, no).ok_or_else(|| DecodeError::UnrecognizedAnswerPair {
        yes: yes.to_string(),
        no: no.to_string(),
    })
}
