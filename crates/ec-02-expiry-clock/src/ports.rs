//! # Time Source Port
//!
//! Wall-clock access behind a trait so windows can be computed against a
//! fixed instant in tests.

use crate::domain::duration::DurationSpec;
use crate::domain::errors::ClockError;
use crate::domain::window::{compute_window, ExpiryWindow};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use shared_types::OffsetTimestamp;

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// UTC offset the local observer renders timestamps in.
    fn utc_offset(&self) -> FixedOffset;

    /// Current instant as an offset-qualified timestamp.
    fn now_offset(&self) -> OffsetTimestamp {
        OffsetTimestamp::from_utc(self.now(), self.utc_offset())
    }
}

/// The host clock and zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn utc_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// A frozen instant and offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedTimeSource {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Freeze at the instant and offset of an existing timestamp.
    pub fn at(timestamp: OffsetTimestamp) -> Self {
        Self::new(timestamp.instant(), timestamp.offset())
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn utc_offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Opens expiry windows against a [`TimeSource`].
#[derive(Debug, Clone)]
pub struct ExpiryClock<T: TimeSource> {
    source: T,
}

impl<T: TimeSource> ExpiryClock<T> {
    pub fn new(source: T) -> Self {
        Self { source }
    }

    /// Open a window of `spec` starting now.
    pub fn open_window(&self, spec: DurationSpec) -> Result<ExpiryWindow, ClockError> {
        compute_window(spec, self.source.now(), self.source.utc_offset())
    }

    pub fn now(&self) -> OffsetTimestamp {
        self.source.now_offset()
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}
