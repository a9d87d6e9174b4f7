//! # Expiry Clock (ec-02)
//!
//! Turns a relative duration (`12h`, `3d`, `45m`) into an absolute,
//! offset-qualified expiry window, and parses the compact window encoding
//! (`<createdAt> +<spec>`) that anchored proposals carry.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Bounded duration | Magnitude is 1..=999 with a unit in {d, h, m} |
//! | 2 | Strict window | `expiresAt` is strictly after `createdAt` |
//! | 3 | Offset-qualified | Both ends carry the observer's UTC offset |
//! | 4 | Instant comparison | Staleness compares absolute instants, never local time |

pub mod domain;
pub mod ports;

pub use domain::duration::{DurationSpec, DurationUnit};
pub use domain::errors::ClockError;
pub use domain::window::{compute_window, is_stale, reconstruct_window, ExpiryWindow};
pub use ports::{ExpiryClock, FixedTimeSource, SystemTimeSource, TimeSource};
