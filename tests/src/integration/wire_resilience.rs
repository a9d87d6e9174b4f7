//! # Wire Resilience
//!
//! Mail clients reflow long lines, quote replies with `>` and forward
//! messages inside other messages. Decoding must see through all of that,
//! and still refuse a Proposal whose content was altered on the way.

#[cfg(test)]
mod tests {
    use ec_01_identity::mint_proposal;
    use ec_03_codec::{
        decode_ballot, decode_bundle, decode_proposal, encode_ballot, encode_bundle,
        encode_proposal, CodecError,
    };
    use ec_05_verdict_tally::assemble_bundle;
    use proptest::prelude::*;
    use shared_types::{ActionKind, Ballot, BallotSlot, Choice, OffsetTimestamp, Proposal};
    use std::collections::BTreeMap;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn printer() -> Proposal {
        mint_proposal(
            "Buy the new printer for the third floor before the end of the quarter",
            ActionKind::Approval,
            OffsetTimestamp::parse("Mon Jan 8 09:30:00 2024 +1000").unwrap(),
            OffsetTimestamp::parse("Wed Jan 10 09:30:00 2024 +1000").unwrap(),
        )
        .unwrap()
    }

    /// Greedy word wrap at `width`, each output line prefixed with `quote`.
    fn reflow(text: &str, width: usize, quote: &str) -> String {
        let mut out = String::new();
        for line in text.lines() {
            let mut current = String::new();
            for word in line.split_whitespace() {
                if !current.is_empty() && current.len() + 1 + word.len() > width {
                    out.push_str(quote);
                    out.push_str(&current);
                    out.push('\n');
                    current.clear();
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            out.push_str(quote);
            out.push_str(&current);
            out.push('\n');
        }
        out
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    proptest! {
        #[test]
        fn test_reflowed_and_quoted_proposal_decodes(
            width in 8usize..100,
            depth in 0usize..3,
        ) {
            let proposal = printer();
            let quote = "> ".repeat(depth);
            let mail = reflow(&encode_proposal(&proposal), width, &quote);
            prop_assert_eq!(decode_proposal(&mail).unwrap(), proposal);
        }

        #[test]
        fn test_reflowed_bundle_decodes(width in 8usize..100) {
            let proposal = printer();
            let mut slots = BTreeMap::new();
            for (n, recipient) in ["ann@example.com", "bob@example.com", "cat@example.com"]
                .into_iter()
                .enumerate()
            {
                let slot = if n == 2 {
                    BallotSlot::Absent
                } else {
                    BallotSlot::Cast(Ballot::new(
                        proposal.id().clone(),
                        proposal.action().response_for(Choice::Yes),
                    ))
                };
                slots.insert(recipient.to_string(), slot);
            }
            let bundle = assemble_bundle(proposal, slots).unwrap();
            let text = encode_bundle(&bundle).unwrap();

            let forwarded = format!(
                "Forwarded for the record.\n\n{}",
                reflow(&text, width, "> ")
            );
            prop_assert_eq!(decode_bundle(&forwarded).unwrap(), decode_bundle(&text).unwrap());
        }
    }

    #[test]
    fn test_reply_above_quoted_proposal_yields_the_reply() {
        let proposal = printer();
        let ballot = Ballot::new(proposal.id().clone(), "I disapprove");
        let mail = format!(
            "Sorry, not this quarter.\n\n{}\nOn Mon, 8 Jan 2024 the leader wrote:\n{}",
            reflow(&encode_ballot(&ballot), 30, ""),
            reflow(&encode_proposal(&proposal), 72, "> ")
        );
        assert_eq!(decode_ballot(&mail).unwrap(), ballot);
    }

    #[test]
    fn test_any_single_character_edit_is_tampering() {
        let proposal = printer();
        let wire = encode_proposal(&proposal);
        let content = proposal.content();
        let field_start = wire.find(content).unwrap();

        for (offset, original) in content.char_indices() {
            let replacement = if original == 'Q' { 'Z' } else { 'Q' };
            let mut tampered = wire.clone();
            let at = field_start + offset;
            tampered.replace_range(at..at + original.len_utf8(), &replacement.to_string());

            assert!(
                matches!(
                    decode_proposal(&tampered),
                    Err(CodecError::IdentityMismatch { .. })
                ),
                "edit at {} went undetected",
                offset
            );
        }
    }

    #[test]
    fn test_ballot_survives_injected_breaks_and_spaces() {
        let proposal = printer();
        let clean = encode_ballot(&Ballot::new(proposal.id().clone(), "I approve"));
        let mangled = clean.replace("I approve", "I\n   approve");
        assert_eq!(decode_ballot(&mangled).unwrap(), decode_ballot(&clean).unwrap());
        assert_eq!(decode_ballot(&mangled).unwrap().content, "I approve");
    }
}
