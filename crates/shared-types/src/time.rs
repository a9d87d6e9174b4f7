//! # Offset-Qualified Timestamps
//!
//! Every protocol timestamp is rendered with an explicit signed UTC offset
//! (`Mon Jan 8 09:30:00 2024 +1000`) so two observers in different zones
//! compare the same instant. Comparison is always on the absolute instant.

use crate::errors::EntityError;
use chrono::{DateTime, Duration, FixedOffset, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Rendering used on the wire: ctime with a single-space day, then the offset.
pub const WIRE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Parsing accepts a one- or two-digit day.
const PARSE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// A second-precision instant carrying the offset it was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffsetTimestamp(DateTime<FixedOffset>);

impl OffsetTimestamp {
    /// Wrap a datetime, dropping sub-second precision (the wire has none).
    pub fn new(datetime: DateTime<FixedOffset>) -> Self {
        Self(datetime.trunc_subsecs(0))
    }

    /// Observe a UTC instant in the given offset.
    pub fn from_utc(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::new(now.with_timezone(&offset))
    }

    /// Parse the wire rendering.
    pub fn parse(text: &str) -> Result<Self, EntityError> {
        DateTime::parse_from_str(text.trim(), PARSE_FORMAT)
            .map(Self::new)
            .map_err(|_| EntityError::InvalidTimestamp {
                input: text.to_string(),
            })
    }

    /// True when `text` parses and is exactly what [`fmt::Display`] renders.
    ///
    /// Identities are computed over the text, so only the canonical rendering
    /// round-trips without changing a Proposal's id.
    pub fn is_canonical(text: &str) -> bool {
        Self::parse(text)
            .map(|ts| ts.to_string() == text)
            .unwrap_or(false)
    }

    /// The underlying datetime, offset included.
    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// The absolute instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// The offset this timestamp was rendered in.
    pub fn offset(&self) -> FixedOffset {
        *self.0.offset()
    }

    /// Add a duration, keeping the offset. `None` on overflow.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self)
    }
}

impl fmt::Display for OffsetTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for OffsetTimestamp {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for OffsetTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OffsetTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
