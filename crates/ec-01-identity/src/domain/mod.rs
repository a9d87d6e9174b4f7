//! Pure identity logic: no I/O, no shared state.

pub mod canonical;
pub mod content;
pub mod errors;
pub mod hasher;
