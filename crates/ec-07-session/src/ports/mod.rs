//! Ports for the session's external collaborators.

pub mod outbound;

pub use outbound::{AnchorRecord, CanonicalStore, InboundMail, MailFilter, MailTransport, RemoteBundle};
