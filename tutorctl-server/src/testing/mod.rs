//! Test support: seedable data generation and an in-memory [`Store`]
//!
//! Compiled unconditionally so integration tests under `tests/` can use it.
//!
//! [`Store`]: crate::db::Store

mod memory;
mod random;

pub use memory::MemoryStore;
pub use random::RandomGen;
