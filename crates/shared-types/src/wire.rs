//! # Wire Vocabulary
//!
//! Marker and label text shared by the codec (which writes and scans it) and
//! the constructive path (which must keep it out of proposal content).

/// The three block kinds carried in mail bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Request,
    Response,
    Bundle,
}

impl BlockKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Request => "REQUEST",
            BlockKind::Response => "RESPONSE",
            BlockKind::Bundle => "BUNDLE",
        }
    }

    /// `# ---------- START BLOCKCHAIN <KIND> ---------- #`
    pub fn start_marker(&self) -> String {
        format!("# ---------- START BLOCKCHAIN {} ---------- #", self.keyword())
    }

    /// `# ---------- END BLOCKCHAIN <KIND> ---------- #`
    pub fn end_marker(&self) -> String {
        format!("# ---------- END BLOCKCHAIN {} ---------- #", self.keyword())
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

pub const MESSAGE_DATE: &str = "MESSAGE DATE:";
pub const EXPIRY_DATE: &str = "EXPIRY DATE:";
pub const MESSAGE_ID: &str = "MESSAGE ID:";
pub const MESSAGE_CONTENTS: &str = "MESSAGE CONTENTS:";
pub const ACTION_REQUESTED: &str = "ACTION REQUESTED:";
pub const MESSAGE_RESPONSE: &str = "MESSAGE RESPONSE:";
pub const REQUEST_ID: &str = "REQUEST ID:";
pub const REQUEST_CONTENTS: &str = "REQUEST CONTENTS:";
pub const RECIPIENTS: &str = "RECIPIENTS:";
pub const RESPONSES: &str = "RESPONSES:";
pub const VERDICT: &str = "VERDICT:";

/// Text that would confuse the field scanner if it appeared inside a value.
pub const RESERVED_PHRASES: &[&str] = &[
    MESSAGE_DATE,
    EXPIRY_DATE,
    MESSAGE_ID,
    MESSAGE_CONTENTS,
    ACTION_REQUESTED,
    MESSAGE_RESPONSE,
    REQUEST_ID,
    REQUEST_CONTENTS,
    RECIPIENTS,
    RESPONSES,
    VERDICT,
    "START BLOCKCHAIN",
    "END BLOCKCHAIN",
];

/// The first reserved phrase found in `text`, if any.
pub fn find_reserved_phrase(text: &str) -> Option<&'static str> {
    RESERVED_PHRASES
        .iter()
        .copied()
        .find(|phrase| text.contains(phrase))
}
