//! Error types for the expiry clock.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("Invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: &'static str },

    #[error("Invalid compact window {input:?}: {reason}")]
    InvalidWindow { input: String, reason: String },

    #[error("Expiry overflows the calendar: {created_at} + {spec}")]
    Overflow { created_at: String, spec: String },
}
