//! # Email-Consensus Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── leader_round.rs       # propose → vote → bundle → audit
//!     ├── ledger_persistence.rs # file ledger across restarts and writers
//!     └── wire_resilience.rs    # reflowed, quoted and tampered mail
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ec-tests
//! cargo test -p ec-tests integration::wire_resilience
//! ```

pub mod integration;
