//! # Error Types
//!
//! Construction errors for the shared entities.

use thiserror::Error;

/// Errors raised when an entity would violate one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Not a 64-character hexadecimal digest.
    #[error("Invalid hash: {input:?} is not 64 hexadecimal characters")]
    InvalidHash { input: String },

    /// Timestamp text could not be parsed.
    #[error("Invalid timestamp: {input:?}")]
    InvalidTimestamp { input: String },

    /// `expiresAt` is not strictly after `createdAt`.
    #[error("Expiry {expires_at} is not after creation {created_at}")]
    InvalidWindow {
        created_at: String,
        expires_at: String,
    },

    /// Proposal content is empty or contains a line break.
    #[error("Invalid proposal content: {reason}")]
    InvalidContent { reason: &'static str },

    /// Business requirement outside 0..=100.
    #[error("Business requirement {0}% is outside 0..=100")]
    InvalidBusinessRequirement(u32),

    /// Action name that no ActionKind maps to.
    #[error("Unsupported action: {0:?}")]
    UnknownAction(String),

    /// Choice text other than yes/no.
    #[error("Unknown choice: {0:?} (expected yes or no)")]
    UnknownChoice(String),
}
