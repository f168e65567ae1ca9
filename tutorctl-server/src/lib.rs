//! tutorctl-server: storage and HTTP layer for a tutoring business
//!
//! - [`models`]: entity types and request validation
//! - [`db`]: Postgres pool, per-statement queries and the transactional
//!   [`PgStore`](db::PgStore) with its composite operations
//! - [`http`]: axum router over any [`Store`](db::Store)
//! - [`testing`]: seedable test data and an in-memory store

pub mod db;
pub mod http;
pub mod models;
pub mod testing;

pub use db::{DbError, PgStore, Store};
pub use http::{run_server, ServerConfig};
