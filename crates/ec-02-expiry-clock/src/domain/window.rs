//! # Expiry Windows
//!
//! An anchored proposal stores its window compactly as
//! `<createdAt> +<spec>`, e.g. `Mon Jan 8 09:30:00 2024 +1000 +12h`. The
//! expiry is recomputed from the creation instant, in the creation offset.

use super::duration::DurationSpec;
use super::errors::ClockError;
use chrono::{DateTime, FixedOffset, Utc};
use shared_types::OffsetTimestamp;
use tracing::debug;

/// A creation instant, the duration it was opened for, and the resulting expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    created_at: OffsetTimestamp,
    expires_at: OffsetTimestamp,
    spec: DurationSpec,
}

impl ExpiryWindow {
    /// Open a window of `spec` starting at `created_at`.
    pub fn starting_at(created_at: OffsetTimestamp, spec: DurationSpec) -> Result<Self, ClockError> {
        let expires_at = created_at
            .checked_add(spec.to_duration())
            .ok_or_else(|| ClockError::Overflow {
                created_at: created_at.to_string(),
                spec: spec.to_string(),
            })?;
        Ok(Self {
            created_at,
            expires_at,
            spec,
        })
    }

    pub fn created_at(&self) -> OffsetTimestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> OffsetTimestamp {
        self.expires_at
    }

    pub fn spec(&self) -> DurationSpec {
        self.spec
    }

    /// `<createdAt> +<spec>`
    pub fn to_compact(&self) -> String {
        format!("{} +{}", self.created_at, self.spec)
    }
}

/// Open a window of `spec` at `now`, observed in `utc_offset`.
pub fn compute_window(
    spec: DurationSpec,
    now: DateTime<Utc>,
    utc_offset: FixedOffset,
) -> Result<ExpiryWindow, ClockError> {
    ExpiryWindow::starting_at(OffsetTimestamp::from_utc(now, utc_offset), spec)
}

/// Parse a compact window back into its parts.
///
/// The timestamp must be the canonical wire rendering, since proposal ids are
/// derived from that text.
pub fn reconstruct_window(compact: &str) -> Result<ExpiryWindow, ClockError> {
    let invalid = |reason: &str| ClockError::InvalidWindow {
        input: compact.to_string(),
        reason: reason.to_string(),
    };

    let (created_text, spec_text) = compact
        .trim()
        .rsplit_once(" +")
        .ok_or_else(|| invalid("missing \" +<duration>\" suffix"))?;
    let spec: DurationSpec = spec_text.parse()?;
    if !OffsetTimestamp::is_canonical(created_text) {
        debug!("[ec-02] non-canonical window timestamp {:?}", created_text);
        return Err(invalid("creation timestamp is not in canonical form"));
    }
    let created_at =
        OffsetTimestamp::parse(created_text).map_err(|e| invalid(&e.to_string()))?;
    ExpiryWindow::starting_at(created_at, spec)
}

/// Whether something sent at `sent_at` missed a window closing at `expires_at`.
pub fn is_stale(sent_at: &OffsetTimestamp, expires_at: &OffsetTimestamp) -> bool {
    sent_at.instant() >= expires_at.instant()
}
