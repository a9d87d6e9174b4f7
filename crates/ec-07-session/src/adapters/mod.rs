//! In-memory collaborator adapters, for tests and offline runs.

pub mod canonical;
pub mod mail;

pub use canonical::InMemoryCanonicalStore;
pub use mail::{InMemoryMailTransport, SentMail};
