//! # Constructive Path
//!
//! Leader-side creation of Proposals, and restoration of a Proposal whose id
//! was recorded elsewhere (wire text, remote anchor).

use crate::domain::content::canonicalize_content;
use crate::domain::errors::IdentityError;
use crate::domain::hasher::{derive_id, verify_id};
use shared_types::{ActionKind, OffsetTimestamp, Proposal, ProposalId};

/// Mint a new Proposal: canonicalize the content and derive its id.
pub fn mint_proposal(
    raw_content: &str,
    action: ActionKind,
    created_at: OffsetTimestamp,
    expires_at: OffsetTimestamp,
) -> Result<Proposal, IdentityError> {
    let content = canonicalize_content(raw_content)?;
    let id = derive_id(&content, &created_at.to_string())?;
    Ok(Proposal::assemble(
        id, content, action, created_at, expires_at,
    )?)
}

/// Rebuild a Proposal under a claimed id, failing if the id does not recompute.
///
/// `content` is taken as given; it must already be the canonical text the id
/// was derived from.
pub fn restore_proposal(
    claimed: ProposalId,
    content: String,
    action: ActionKind,
    created_at: OffsetTimestamp,
    expires_at: OffsetTimestamp,
) -> Result<Proposal, IdentityError> {
    verify_id(&claimed, &content, &created_at.to_string())?;
    Ok(Proposal::assemble(
        claimed, content, action, created_at, expires_at,
    )?)
}
