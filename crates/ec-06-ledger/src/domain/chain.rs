//! Chain verification.

use super::block::{genesis_previous_hash, Block, EntryKind};
use shared_types::ProposalId;
use std::collections::HashSet;
use std::fmt;

/// The first block that breaks a chain invariant, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFault {
    pub index: usize,
    pub reason: String,
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {}: {}", self.index, self.reason)
    }
}

/// Recompute every hash and check linkage, entry uniqueness and bundle
/// anchoring end to end.
pub fn verify_blocks(blocks: &[Block]) -> Result<(), ChainFault> {
    let mut seen: HashSet<(EntryKind, &ProposalId)> = HashSet::new();
    let mut expected_previous = genesis_previous_hash();

    for (position, block) in blocks.iter().enumerate() {
        let fault = |reason: String| ChainFault {
            index: position,
            reason,
        };

        if block.index != position as u64 {
            return Err(fault(format!("index is {}", block.index)));
        }
        if block.kind != block.payload.kind() {
            return Err(fault(format!(
                "kind {} does not match payload {}",
                block.kind,
                block.payload.kind()
            )));
        }
        if block.previous_hash != expected_previous {
            return Err(fault("previous hash does not link".to_string()));
        }
        let recomputed = block
            .recompute_hash()
            .map_err(|e| fault(e.to_string()))?;
        if recomputed != block.own_hash {
            return Err(fault("contents do not match the block hash".to_string()));
        }

        let proposal_id = block.payload.proposal_id();
        if block.kind == EntryKind::Bundle && !seen.contains(&(EntryKind::Proposal, proposal_id)) {
            return Err(fault(format!(
                "bundle for {} precedes its proposal",
                proposal_id.short()
            )));
        }
        if !seen.insert((block.kind, proposal_id)) {
            return Err(fault(format!(
                "second {} for {}",
                block.kind,
                proposal_id.short()
            )));
        }

        expected_previous = block.own_hash.clone();
    }
    Ok(())
}
