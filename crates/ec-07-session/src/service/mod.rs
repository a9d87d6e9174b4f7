//! Session services: the leader and recipient workflows, and bundle audit.

pub mod audit;
pub mod leader;
pub mod recipient;

pub use audit::{reconstruct_bundle, retrieve_remote_bundle};
pub use leader::{LeaderDependencies, LeaderSession};
pub use recipient::RecipientSession;
