use crate::domain::block::Block;
use crate::domain::errors::StoreError;
use crate::ports::LedgerStore;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory ledger store.
///
/// `fail_saves` makes every subsequent save fail, for exercising the
/// ledger's rollback path.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    blocks: RwLock<Vec<Block>>,
    fail_saves: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing (possibly invalid) sequence.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: RwLock::new(blocks),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Replace the stored sequence behind the ledger's back.
    pub fn overwrite(&self, blocks: Vec<Block>) {
        *self.blocks.write() = blocks;
    }

    /// What a fresh `load` would return.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<Vec<Block>, StoreError> {
        Ok(self.blocks.read().clone())
    }

    fn save(&self, blocks: &[Block]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "memory".to_string(),
                message: "save rejected".to_string(),
            });
        }
        *self.blocks.write() = blocks.to_vec();
        Ok(())
    }
}
