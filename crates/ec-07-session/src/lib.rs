//! # Session Workflows (ec-07)
//!
//! Composes the protocol core into the leader and recipient workflows, and
//! defines the ports for the two external collaborators: the canonical
//! remote store and the mail transport.
//!
//! ## Leader
//!
//! ```text
//! ProposalDraft ──propose──→ BallotRound ──collect_ballots──→ close ──→ Bundle
//!      │                         ▲                                        │
//!      ├─ new key: mint, create, append Proposal                          ├─ append Bundle
//!      └─ anchored key: consistency check, restore                        └─ send BUNDLE
//! ```
//!
//! ## Recipient
//!
//! `read_proposal` → `draft_ballot` → `cast_ballot` (remote vote, reply mail).
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | One anchor per logical key | remote `create`; re-propose checks drift |
//! | Stale replies never counted | `BallotRound::record_reply` |
//! | A cast ballot is final | `BallotRound::record_reply` |
//! | Bundle committed once | ledger `(kind, proposalId)` uniqueness |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - drafts and ballot rounds
//! - `ports/` - collaborator traits
//! - `adapters/` - in-memory collaborators
//! - `service/` - leader and recipient sessions, bundle audit
//! - `config.rs` - `SessionConfig`

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryCanonicalStore, InMemoryMailTransport, SentMail};
pub use config::{ConfigError, SessionConfig};
pub use domain::{BallotRound, ProposalDraft, ReplyOutcome};
pub use errors::{SessionError, SessionResult};
pub use ports::{AnchorRecord, CanonicalStore, InboundMail, MailFilter, MailTransport, RemoteBundle};
pub use service::{
    reconstruct_bundle, retrieve_remote_bundle, LeaderDependencies, LeaderSession,
    RecipientSession,
};
