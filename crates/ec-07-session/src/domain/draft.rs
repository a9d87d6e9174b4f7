//! A leader's proposal before it is minted.

use crate::errors::{SessionError, SessionResult};
use ec_01_identity::canonicalize_content;
use ec_02_expiry_clock::DurationSpec;
use shared_types::{ActionKind, BusinessRequirement};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalDraft {
    /// Mail subject; with the leader address it forms the logical key.
    pub subject: String,
    pub content: String,
    pub recipients: Vec<String>,
    pub expiry: DurationSpec,
    pub business_requirement: BusinessRequirement,
    pub action: ActionKind,
}

impl ProposalDraft {
    pub fn new(
        subject: impl Into<String>,
        content: impl Into<String>,
        recipients: Vec<String>,
        expiry: DurationSpec,
        business_requirement: BusinessRequirement,
    ) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
            recipients,
            expiry,
            business_requirement,
            action: ActionKind::Approval,
        }
    }

    /// Check every field and return the canonical content.
    pub fn validate(&self, min_content_len: usize) -> SessionResult<String> {
        if self.subject.trim().is_empty() {
            return Err(invalid("subject", "is empty"));
        }
        if self.recipients.is_empty() {
            return Err(invalid("recipients", "is empty"));
        }

        let mut seen = HashSet::new();
        for recipient in &self.recipients {
            let address = recipient.trim();
            if address.is_empty() || address.contains(',') || address.contains(char::is_whitespace)
            {
                return Err(invalid("recipients", format!("contains {:?}", recipient)));
            }
            if !seen.insert(address.to_ascii_lowercase()) {
                return Err(invalid("recipients", format!("lists {} twice", address)));
            }
        }

        let content = canonicalize_content(&self.content)?;
        let len = content.chars().count();
        if len < min_content_len {
            return Err(invalid(
                "content",
                format!("is {} characters, minimum is {}", len, min_content_len),
            ));
        }
        Ok(content)
    }

    /// Recipient addresses, trimmed.
    pub fn recipient_addresses(&self) -> impl Iterator<Item = &str> {
        self.recipients.iter().map(|r| r.trim())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SessionError {
    SessionError::InvalidDraft {
        field,
        reason: reason.into(),
    }
}
