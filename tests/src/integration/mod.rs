//! Cross-subsystem integration flows.

pub mod leader_round;
pub mod ledger_persistence;
pub mod wire_resilience;
