//! # Wire Codec (ec-03)
//!
//! Encodes Proposals, Ballots and Bundles into the plain-text blocks that
//! travel inside mail bodies, and decodes them back from text that mail
//! clients may have reflowed, quoted or re-spaced.
//!
//! ## Decoding Pipeline
//!
//! ```text
//! mail body ──normalize──→ one line ──find_block──→ block body ──scan_fields──→ values
//!                                                                               │
//!                       Proposal / Ballot / WireBundle ←──validate (ids, times)─┘
//! ```
//!
//! Decoding fails closed: a missing marker, a missing or empty field, a
//! malformed id or a non-canonical timestamp is an error, never a guess.
//! A Proposal whose id does not recompute from its content and creation
//! timestamp is rejected as tampered.

pub mod ballot;
pub mod bundle;
pub mod errors;
pub mod proposal;
pub mod scanner;

pub use ballot::{decode_ballot, encode_ballot, encode_ballot_template};
pub use bundle::{decode_bundle, encode_bundle, WireBundle, ABSENT_RESPONSE, INVALID_RESPONSE};
pub use errors::{CodecError, CodecResult, DecodeError, MarkerEdge};
pub use proposal::{decode_proposal, encode_proposal};
