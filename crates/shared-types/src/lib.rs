//! # Shared Types Crate
//!
//! This crate contains the protocol entities exchanged between subsystems and
//! carried over the wire.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Proposal, Ballot and Bundle are defined once
//!   here; codec, tally and ledger all speak these types.
//! - **Immutability**: a Proposal is never mutated after construction. Its
//!   fields are private and only readable through accessors.
//! - **Offset-qualified time**: every timestamp carries an explicit UTC offset
//!   and compares as an absolute instant.

pub mod entities;
pub mod errors;
pub mod time;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use time::OffsetTimestamp;
pub use wire::BlockKind;
