//! # Ledger Service
//!
//! Owns the in-memory chain and its store. Appends are serialized by a
//! single lock held across "check duplicate, seal, save, publish", so two
//! concurrent appends never link to the same previous hash.

use crate::domain::block::{genesis_previous_hash, Block, BlockRef, EntryKind, LedgerEntry};
use crate::domain::chain::verify_blocks;
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::ports::LedgerStore;
use parking_lot::Mutex;
use shared_types::{Bundle, HexHash, Proposal, ProposalId};
use tracing::{debug, error, info, warn};

pub struct Ledger<S: LedgerStore> {
    store: S,
    chain: Mutex<Vec<Block>>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Load and verify the stored chain. A chain that does not verify is
    /// refused with `CorruptLedger`.
    pub fn open(store: S) -> LedgerResult<Self> {
        let blocks = store.load().map_err(|e| match e {
            crate::StoreError::Format { .. } => LedgerError::CorruptLedger {
                reason: e.to_string(),
            },
            io => LedgerError::Store(io),
        })?;

        if let Err(fault) = verify_blocks(&blocks) {
            error!("[ec-06] refusing corrupt ledger: {}", fault);
            return Err(LedgerError::CorruptLedger {
                reason: fault.to_string(),
            });
        }

        info!("[ec-06] ledger open with {} blocks", blocks.len());
        Ok(Self {
            store,
            chain: Mutex::new(blocks),
        })
    }

    /// Append an entry unless its `(kind, proposalId)` is already recorded.
    ///
    /// A Bundle is only accepted once its Proposal is on the chain. The
    /// chain grows only after the store has saved the extended sequence; on
    /// any failure it is left unchanged.
    pub fn append(&self, entry: LedgerEntry) -> LedgerResult<BlockRef> {
        let mut chain = self.chain.lock();

        let kind = entry.kind();
        let proposal_id = entry.proposal_id().clone();
        if contains(&chain, kind, &proposal_id) {
            warn!(
                "[ec-06] duplicate {} for {} rejected",
                kind,
                proposal_id.short()
            );
            return Err(LedgerError::DuplicateEntry { kind, proposal_id });
        }
        if kind == EntryKind::Bundle && !contains(&chain, EntryKind::Proposal, &proposal_id) {
            warn!(
                "[ec-06] bundle for unanchored proposal {} rejected",
                proposal_id.short()
            );
            return Err(LedgerError::UnknownProposal { proposal_id });
        }

        let previous_hash = chain
            .last()
            .map(|block| block.own_hash.clone())
            .unwrap_or_else(genesis_previous_hash);
        let block = Block::seal(chain.len() as u64, entry, previous_hash)?;

        let mut extended = Vec::with_capacity(chain.len() + 1);
        extended.extend(chain.iter().cloned());
        extended.push(block);
        self.store.save(&extended)?;
        *chain = extended;

        let reference = chain
            .last()
            .map(Block::reference)
            .ok_or_else(|| LedgerError::Serialization("chain empty after append".into()))?;
        info!(
            "[ec-06] appended block {} ({} {})",
            reference.index,
            kind,
            proposal_id.short()
        );
        Ok(reference)
    }

    /// The block whose own hash is `hash`, or the Proposal block whose
    /// Proposal id is `hash`.
    pub fn find_by_hash(&self, hash: &HexHash) -> LedgerResult<Block> {
        let chain = self.chain.lock();
        chain
            .iter()
            .find(|block| &block.own_hash == hash)
            .or_else(|| {
                chain.iter().find(|block| {
                    block.kind == EntryKind::Proposal && block.payload.proposal_id() == hash
                })
            })
            .cloned()
            .ok_or_else(|| {
                debug!("[ec-06] no block for {}", hash.short());
                LedgerError::NotFound {
                    hash: hash.to_string(),
                }
            })
    }

    /// The anchored Proposal with this id.
    pub fn find_proposal(&self, id: &ProposalId) -> Option<Proposal> {
        self.chain.lock().iter().find_map(|block| match &block.payload {
            LedgerEntry::Proposal(proposal) if proposal.id() == id => Some(proposal.clone()),
            _ => None,
        })
    }

    /// The committed Bundle for this Proposal id.
    pub fn find_bundle(&self, id: &ProposalId) -> Option<Bundle> {
        self.chain.lock().iter().find_map(|block| match &block.payload {
            LedgerEntry::Bundle(bundle) if bundle.proposal().id() == id => Some(bundle.clone()),
            _ => None,
        })
    }

    pub fn contains(&self, kind: EntryKind, id: &ProposalId) -> bool {
        contains(&self.chain.lock(), kind, id)
    }

    /// Reload the stored chain, recompute every block hash, check linkage
    /// end to end and require the stored blocks to match the open chain.
    ///
    /// A store that cannot be read or parsed fails verification.
    pub fn verify_chain(&self) -> bool {
        let chain = self.chain.lock();
        let stored = match self.store.load() {
            Ok(blocks) => blocks,
            Err(e) => {
                warn!("[ec-06] chain verification could not load store: {}", e);
                return false;
            }
        };

        if let Err(fault) = verify_blocks(&stored) {
            warn!("[ec-06] chain verification failed at {}", fault);
            return false;
        }
        if stored != *chain {
            warn!(
                "[ec-06] stored chain ({} blocks) diverges from open chain ({} blocks)",
                stored.len(),
                chain.len()
            );
            return false;
        }
        true
    }

    /// Persist the current chain again.
    pub fn save(&self) -> LedgerResult<()> {
        let chain = self.chain.lock();
        self.store.save(&chain)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chain.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.lock().is_empty()
    }

    /// Copy of the chain.
    pub fn blocks(&self) -> Vec<Block> {
        self.chain.lock().clone()
    }

    /// Hash the next block will link to.
    pub fn head_hash(&self) -> HexHash {
        self.chain
            .lock()
            .last()
            .map(|block| block.own_hash.clone())
            .unwrap_or_else(genesis_previous_hash)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn contains(chain: &[Block], kind: EntryKind, id: &ProposalId) -> bool {
    chain
        .iter()
        .any(|block| block.kind == kind && block.payload.proposal_id() == id)
}
