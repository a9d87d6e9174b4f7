//! Bundle audit, local and remote.

use crate::errors::{SessionError, SessionResult};
use crate::ports::{CanonicalStore, RemoteBundle};
use ec_03_codec::decode_bundle;
use ec_05_verdict_tally::audit_bundle;
use ec_06_ledger::{Ledger, LedgerStore};
use shared_types::{Bundle, ProposalId};
use tracing::{debug, warn};

/// Rebuild a received Bundle against the anchored Proposal and re-tally it.
///
/// The wire Bundle must name an anchored Proposal and agree with it on
/// content and action. Its claimed verdict must match the recomputed one.
pub fn reconstruct_bundle<S: LedgerStore>(text: &str, ledger: &Ledger<S>) -> SessionResult<Bundle> {
    let wire = decode_bundle(text)?;
    let proposal = ledger
        .find_proposal(&wire.proposal_id)
        .ok_or_else(|| SessionError::NotAnchored {
            proposal_id: wire.proposal_id.clone(),
        })?;

    let field = if proposal.content() != wire.content {
        Some("content")
    } else if proposal.action() != wire.action {
        Some("action")
    } else {
        None
    };
    if let Some(field) = field {
        warn!(
            "[ec-07] bundle for {} disagrees on {}",
            wire.proposal_id.short(),
            field
        );
        return Err(SessionError::AnchorMismatch {
            proposal_id: wire.proposal_id,
            field,
        });
    }

    let bundle = Bundle::new(proposal, wire.slots, wire.claimed_verdict);
    audit_bundle(&bundle)?;
    debug!("[ec-07] bundle for {} audited", bundle.proposal().id().short());
    Ok(bundle)
}

/// Fetch the store's tally, finalizing it first if nobody has.
pub async fn retrieve_remote_bundle<C>(store: &C, proposal_id: &ProposalId) -> SessionResult<RemoteBundle>
where
    C: CanonicalStore + ?Sized,
{
    if !store
        .is_finalized(proposal_id)
        .await
        .map_err(SessionError::Store)?
    {
        debug!("[ec-07] finalizing {}", proposal_id.short());
        store
            .consensus_finalize(proposal_id)
            .await
            .map_err(SessionError::Store)?;
    }
    store
        .fetch_bundle(proposal_id)
        .await
        .map_err(SessionError::Store)
}
