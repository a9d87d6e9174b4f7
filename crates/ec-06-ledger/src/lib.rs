//! # Local Ledger (ec-06)
//!
//! An append-only, hash-chained record of Proposals and Bundles. A Bundle is
//! only accepted once its Proposal is on the chain, and each Proposal and
//! each Bundle is recorded at most once.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Hash chaining | `block[i].previousHash == block[i-1].ownHash`; genesis links to 64 zeros |
//! | 2 | Sealed blocks | `ownHash` is SHA-256 of `{index, kind, payload, previousHash}` |
//! | 3 | Unique entries | At most one block per `(kind, proposalId)` |
//! | 4 | Anchored bundles | A Bundle's Proposal precedes it on the chain |
//! | 5 | Atomic persistence | The chain only grows after the store durably saved it |
//! | 6 | Fail-closed load | A chain that does not verify is refused |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - blocks, sealing and chain verification
//! - `ports.rs` - the `LedgerStore` persistence port
//! - `adapters/` - JSON file store and in-memory store
//! - `service/` - the `Ledger` itself
//!
//! ## Usage
//!
//! ```ignore
//! use ec_06_ledger::{FileLedgerStore, Ledger, LedgerEntry};
//!
//! let ledger = Ledger::open(FileLedgerStore::new("data/ledger.json"))?;
//! let block = ledger.append(LedgerEntry::Proposal(proposal))?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileLedgerStore, InMemoryLedgerStore};
pub use domain::block::{genesis_previous_hash, Block, BlockRef, EntryKind, LedgerEntry};
pub use domain::chain::{verify_blocks, ChainFault};
pub use domain::errors::{LedgerError, LedgerResult, StoreError};
pub use ports::LedgerStore;
pub use service::Ledger;
