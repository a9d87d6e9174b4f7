//! # Outbound Ports (Driven Ports)
//!
//! Persistence required by the ledger.

use crate::domain::block::Block;
use crate::domain::errors::StoreError;

/// Durable storage for the full, ordered block sequence.
///
/// Production: `FileLedgerStore` (adapters/file.rs)
/// Testing: `InMemoryLedgerStore` (adapters/memory.rs)
pub trait LedgerStore: Send + Sync {
    /// Restore the stored sequence; empty if nothing was ever saved.
    fn load(&self) -> Result<Vec<Block>, StoreError>;

    /// Replace the stored sequence.
    ///
    /// ## Atomicity
    ///
    /// A partially written sequence must never be observable. On failure the
    /// previously saved sequence stays intact and the error is returned.
    fn save(&self, blocks: &[Block]) -> Result<(), StoreError>;
}
