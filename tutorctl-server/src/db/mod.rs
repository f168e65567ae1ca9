//! Database layer - connection pool, query executor and store
//!
//! # Layers
//!
//! - [`Queries`]: one parameterised statement per call, bound to a single
//!   connection (pooled or transactional)
//! - [`PgStore`]: owns the pool, runs queries on pooled connections and
//!   composes multi-statement operations inside `exec_tx`
//! - [`Store`]: the trait the HTTP layer depends on

pub mod error;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod store;

pub use error::DbError;
pub use pool::create_pool;
pub use queries::Queries;
pub use store::{PgStore, Store};
