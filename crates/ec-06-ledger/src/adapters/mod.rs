//! # Adapters Module
//!
//! - `file`: JSON file with temp-file-and-rename saves
//! - `memory`: in-process store for tests and dry runs

pub mod file;
pub mod memory;

pub use file::FileLedgerStore;
pub use memory::InMemoryLedgerStore;
