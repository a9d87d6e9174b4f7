//! # Blocks
//!
//! Each block wraps one Proposal or one Bundle and is sealed by hashing its
//! index, kind, payload and the previous block's hash.

use super::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Bundle, HexHash, Proposal, ProposalId};
use std::fmt;

/// What a block records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Proposal,
    Bundle,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Proposal => f.write_str("Proposal"),
            EntryKind::Bundle => f.write_str("Bundle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerEntry {
    Proposal(Proposal),
    Bundle(Bundle),
}

impl LedgerEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            LedgerEntry::Proposal(_) => EntryKind::Proposal,
            LedgerEntry::Bundle(_) => EntryKind::Bundle,
        }
    }

    /// The Proposal this entry is about.
    pub fn proposal(&self) -> &Proposal {
        match self {
            LedgerEntry::Proposal(proposal) => proposal,
            LedgerEntry::Bundle(bundle) => bundle.proposal(),
        }
    }

    /// Logical key: together with [`LedgerEntry::kind`], unique on the chain.
    pub fn proposal_id(&self) -> &ProposalId {
        self.proposal().id()
    }
}

/// Previous hash of the first block.
pub fn genesis_previous_hash() -> HexHash {
    HexHash::zero()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub kind: EntryKind,
    pub payload: LedgerEntry,
    pub previous_hash: HexHash,
    pub own_hash: HexHash,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockPreimage<'a> {
    index: u64,
    kind: EntryKind,
    payload: &'a LedgerEntry,
    previous_hash: &'a HexHash,
}

impl Block {
    /// Build and seal the block at `index`.
    pub fn seal(index: u64, payload: LedgerEntry, previous_hash: HexHash) -> LedgerResult<Self> {
        let kind = payload.kind();
        let own_hash = seal_hash(index, kind, &payload, &previous_hash)?;
        Ok(Self {
            index,
            kind,
            payload,
            previous_hash,
            own_hash,
        })
    }

    /// Hash this block's contents should seal to.
    pub fn recompute_hash(&self) -> LedgerResult<HexHash> {
        seal_hash(self.index, self.kind, &self.payload, &self.previous_hash)
    }

    pub fn reference(&self) -> BlockRef {
        BlockRef {
            index: self.index,
            hash: self.own_hash.clone(),
        }
    }
}

fn seal_hash(
    index: u64,
    kind: EntryKind,
    payload: &LedgerEntry,
    previous_hash: &HexHash,
) -> LedgerResult<HexHash> {
    let preimage = BlockPreimage {
        index,
        kind,
        payload,
        previous_hash,
    };
    let bytes =
        serde_json::to_vec(&preimage).map_err(|e| LedgerError::Serialization(e.to_string()))?;
    Ok(HexHash::from_bytes(Sha256::digest(&bytes).into()))
}

/// Position and hash of an appended block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockRef {
    pub index: u64,
    pub hash: HexHash,
}
