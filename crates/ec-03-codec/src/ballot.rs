//! RESPONSE blocks.

use crate::errors::DecodeError;
use crate::scanner::{field_line, find_block, normalize, parse_id, scan_fields};
use shared_types::wire::{MESSAGE_ID, MESSAGE_RESPONSE};
use shared_types::{Ballot, BlockKind, Proposal, ProposalId};

fn encode_response(proposal_id: &ProposalId, response: &str) -> String {
    let kind = BlockKind::Response;
    let mut out = [
        kind.start_marker(),
        field_line(MESSAGE_ID, proposal_id.as_str()),
        field_line(MESSAGE_RESPONSE, response),
        kind.end_marker(),
    ]
    .join("\n");
    out.push('\n');
    out
}

/// A RESPONSE block carrying the Ballot's content.
pub fn encode_ballot(ballot: &Ballot) -> String {
    encode_response(&ballot.proposal_id, &ballot.content)
}

/// The unfilled RESPONSE block appended to a Proposal: `I <yes> OR I <no>`.
pub fn encode_ballot_template(proposal: &Proposal) -> String {
    let (yes, no) = proposal.expected_responses();
    encode_response(proposal.id(), &format!("{} OR {}", yes, no))
}

/// Decode the first RESPONSE block in `text`.
///
/// The content is returned as written (whitespace collapsed); whether it is
/// an acceptable answer is decided when tallying.
pub fn decode_ballot(text: &str) -> Result<Ballot, DecodeError> {
    let kind = BlockKind::Response;
    let normalized = normalize(text);
    let body = find_block(&normalized, kind)?;
    let [id, response] = scan_fields(body, kind, [MESSAGE_ID, MESSAGE_RESPONSE])?;
    let proposal_id = parse_id(MESSAGE_ID, id)?;
    Ok(Ballot::new(proposal_id, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::HexHash;

    const ID: &str = "e956753659a5eb089a71de989ee2ee0055ecdc0127c3856f2b1b1f6acae70b13";

    fn wire(response: &str) -> String {
        format!(
            "# ---------- START BLOCKCHAIN RESPONSE ---------- #\n\
             # MESSAGE ID: {}\n\
             # MESSAGE RESPONSE: {}\n\
             # ---------- END BLOCKCHAIN RESPONSE ---------- #\n",
            ID, response
        )
    }

    #[test]
    fn test_encode_ballot_layout() {
        let ballot = Ballot::new(HexHash::parse(ID).unwrap(), "I approve");
        assert_eq!(encode_ballot(&ballot), wire("I approve"));
    }

    #[test]
    fn test_decode_ballot() {
        let ballot = decode_ballot(&wire("I disapprove")).unwrap();
        assert_eq!(ballot.proposal_id.as_str(), ID);
        assert_eq!(ballot.content, "I disapprove");
    }

    #[test]
    fn test_decode_keeps_unedited_template_verbatim() {
        let ballot = decode_ballot(&wire("I approve OR I disapprove")).unwrap();
        assert_eq!(ballot.content, "I approve OR I disapprove");
    }

    #[test]
    fn test_decode_uppercase_id_is_folded() {
        let upper = wire("I approve").replace(ID, &ID.to_uppercase());
        assert_eq!(decode_ballot(&upper).unwrap().proposal_id.as_str(), ID);
    }

    #[test]
    fn test_decode_rejects_non_hash_id() {
        let bad = wire("I approve").replace(ID, "totesNotTheID");
        assert!(matches!(
            decode_ballot(&bad),
            Err(DecodeError::MalformedId { .. })
        ));
        let long = wire("I approve").replace(ID, &format!("{}0", ID));
        assert!(matches!(
            decode_ballot(&long),
            Err(DecodeError::MalformedId { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_missing_response() {
        let text = wire("I approve").replace("# MESSAGE RESPONSE: I approve\n", "");
        assert!(matches!(
            decode_ballot(&text),
            Err(DecodeError::MissingField { .. })
        ));
    }

    #[test]
    fn test_first_response_block_wins() {
        let reply = format!("{}\n> {}", wire("I disapprove"), wire("I approve OR I disapprove"));
        assert_eq!(decode_ballot(&reply).unwrap().content, "I disapprove");
    }

    proptest! {
        #[test]
        fn prop_injected_whitespace_is_tolerated(
            breaks in prop::collection::vec(prop_oneof![Just(" "), Just("  "), Just("\n"), Just("\r\n "), Just("\t")], 1..4),
        ) {
            let clean = decode_ballot(&wire("I approve")).unwrap();
            let gap = breaks.concat();
            let mangled = decode_ballot(&wire(&format!("I{}approve", gap))).unwrap();
            prop_assert_eq!(mangled, clean);
        }
    }
}
