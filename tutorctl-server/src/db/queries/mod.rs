//! Query executor: one statement per call
//!
//! `Queries` borrows a single connection. Built from a pooled connection
//! each call autocommits; built from an open transaction every call joins
//! that transaction. Statements are issued in call order.

mod invoices;
mod lessons;
mod payments;
mod receipts;
mod references;
mod students;

use sqlx::postgres::PgQueryResult;
use sqlx::PgConnection;

use super::DbError;

/// Statement executor bound to one connection
pub struct Queries<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> Queries<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

/// Turn a zero-rows-affected UPDATE into `NotFound`.
fn expect_row(
    result: PgQueryResult,
    resource: &'static str,
    id: i64,
) -> Result<(), DbError> {
    if result.rows_affected() == 0 {
        return Err(DbError::not_found(resource, id));
    }
    Ok(())
}
