//! # Identity Derivation
//!
//! A Proposal's id is SHA-256 over a versioned canonical preimage of
//! `(content, createdAt)`, rendered as lowercase hex.

use super::canonical::to_legacy_json;
use super::errors::IdentityError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared_types::{HexHash, ProposalId};
use tracing::debug;

/// Versions of the identity preimage.
///
/// Changing how the preimage is serialized changes every id in the protocol,
/// so each rendering is a separate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdentityScheme {
    /// `{"date": <createdAt>, "messageContents": <content>}` in the legacy
    /// JSON rendering.
    #[default]
    V1,
}

impl IdentityScheme {
    /// Scheme used to mint new Proposals.
    pub const CURRENT: IdentityScheme = IdentityScheme::V1;

    /// The exact bytes that are hashed.
    pub fn preimage(&self, content: &str, created_at: &str) -> Result<Vec<u8>, IdentityError> {
        match self {
            IdentityScheme::V1 => {
                // Keys in sorted order.
                #[derive(Serialize)]
                struct PreimageV1<'a> {
                    date: &'a str,
                    #[serde(rename = "messageContents")]
                    message_contents: &'a str,
                }

                to_legacy_json(&PreimageV1 {
                    date: created_at,
                    message_contents: content,
                })
                .map_err(|e| IdentityError::Canonicalization(e.to_string()))
            }
        }
    }
}

/// SHA-256 of `bytes` as a [`HexHash`].
pub fn sha256_hex(bytes: &[u8]) -> HexHash {
    HexHash::from_bytes(Sha256::digest(bytes).into())
}

/// Derive a Proposal id with the current scheme.
///
/// `created_at` is the wire rendering of the creation timestamp; the id covers
/// the text, not the instant.
pub fn derive_id(content: &str, created_at: &str) -> Result<ProposalId, IdentityError> {
    derive_id_with(IdentityScheme::CURRENT, content, created_at)
}

pub fn derive_id_with(
    scheme: IdentityScheme,
    content: &str,
    created_at: &str,
) -> Result<ProposalId, IdentityError> {
    let preimage = scheme.preimage(content, created_at)?;
    Ok(sha256_hex(&preimage))
}

/// Recompute the id and compare it with the claimed one.
pub fn verify_id(
    claimed: &ProposalId,
    content: &str,
    created_at: &str,
) -> Result<(), IdentityError> {
    let recomputed = derive_id(content, created_at)?;
    if &recomputed != claimed {
        debug!(
            "[ec-01] identity mismatch: claimed {} recomputed {}",
            claimed.short(),
            recomputed.short()
        );
        return Err(IdentityError::IdentityMismatch {
            claimed: claimed.clone(),
            recomputed,
        });
    }
    Ok(())
}

/// Hash of the raw content, compared across local and remote views.
pub fn content_hash(content: &str) -> HexHash {
    sha256_hex(content.as_bytes())
}

/// Key under which a leader's proposal is anchored remotely.
///
/// One leader re-sending the same subject resolves to the same key.
pub fn logical_key(leader_address: &str, subject: &str) -> HexHash {
    let mut hasher = Sha256::new();
    hasher.update(leader_address.as_bytes());
    hasher.update(subject.as_bytes());
    HexHash::from_bytes(hasher.finalize().into())
}
