//! # Content Identity (ec-01)
//!
//! Derives the content-addressed identity of a Proposal and owns the
//! constructive path that mints new Proposals.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Determinism | Identical `(content, createdAt)` always yield an identical id |
//! | 2 | Versioned preimage | Any change to the canonical serialization is a new `IdentityScheme` |
//! | 3 | Canonical content | Minted content has no line breaks and no whitespace runs |
//! | 4 | Tamper evidence | A claimed id that does not recompute is rejected, never corrected |
//!
//! ## Crate Structure
//!
//! - `domain/canonical.rs` - legacy-compatible JSON preimage
//! - `domain/hasher.rs` - `derive_id`, `verify_id`, content hash, logical key
//! - `domain/content.rs` - content canonicalization
//! - `mint.rs` - constructive Proposal path and id-checked restoration
//!
//! ## Usage
//!
//! ```ignore
//! use ec_01_identity::derive_id;
//!
//! let id = derive_id("Buy the new printer", "Mon Jan 8 09:30:00 2024 +1000")?;
//! ```

pub mod domain;
pub mod mint;

pub use domain::content::canonicalize_content;
pub use domain::errors::IdentityError;
pub use domain::hasher::{
    content_hash, derive_id, derive_id_with, logical_key, sha256_hex, verify_id, IdentityScheme,
};
pub use mint::{mint_proposal, restore_proposal};
