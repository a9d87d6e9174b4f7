pub mod block;
pub mod chain;
pub mod errors;
