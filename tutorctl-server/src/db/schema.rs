//! Idempotent schema bootstrap
//!
//! Creates the tables on an empty database so the server can start. Every
//! statement is `IF NOT EXISTS`; there is no versioning or down path.
//! Foreign keys have no `ON DELETE CASCADE`: composite deletes remove
//! children explicitly.

use sqlx::PgPool;

use super::DbError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS colleges (
        college_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS funnels (
        funnel_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lesson_locations (
        location_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lesson_subjects (
        subject_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payment_methods (
        payment_method_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        student_id BIGSERIAL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT,
        phone_number TEXT,
        address TEXT,
        college_id BIGINT REFERENCES colleges (college_id),
        funnel_id BIGINT REFERENCES funnels (funnel_id),
        hourly_fee DOUBLE PRECISION,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lessons (
        lesson_id BIGSERIAL PRIMARY KEY,
        lesson_datetime TIMESTAMPTZ NOT NULL,
        duration BIGINT NOT NULL,
        location_id BIGINT NOT NULL REFERENCES lesson_locations (location_id),
        subject_id BIGINT NOT NULL REFERENCES lesson_subjects (subject_id),
        notes TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        invoice_id BIGSERIAL PRIMARY KEY,
        student_id BIGINT NOT NULL REFERENCES students (student_id),
        lesson_id BIGINT NOT NULL REFERENCES lessons (lesson_id),
        invoice_datetime TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        hourly_fee DOUBLE PRECISION NOT NULL,
        duration BIGINT NOT NULL,
        discount DOUBLE PRECISION NOT NULL DEFAULT 0,
        amount DOUBLE PRECISION NOT NULL,
        notes TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS receipts (
        receipt_id BIGSERIAL PRIMARY KEY,
        student_id BIGINT NOT NULL REFERENCES students (student_id),
        receipt_datetime TIMESTAMPTZ NOT NULL,
        amount DOUBLE PRECISION NOT NULL DEFAULT 0,
        notes TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        payment_id BIGSERIAL PRIMARY KEY,
        receipt_id BIGINT NOT NULL REFERENCES receipts (receipt_id),
        payment_datetime TIMESTAMPTZ NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        payment_method_id BIGINT NOT NULL REFERENCES payment_methods (payment_method_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_invoices_lesson ON invoices (lesson_id)",
    "CREATE INDEX IF NOT EXISTS idx_invoices_student ON invoices (student_id)",
    "CREATE INDEX IF NOT EXISTS idx_receipts_student ON receipts (student_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_receipt ON payments (receipt_id)",
];

/// Advisory lock key held while the schema is applied
const SCHEMA_LOCK_KEY: i64 = 0x7475_746f_7263_746c;

/// Create any missing tables and indexes.
///
/// Concurrent callers are serialized on a transaction-scoped advisory lock;
/// `IF NOT EXISTS` alone still races on the catalog.
pub async fn apply(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Applying database schema...");

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = STATEMENTS.len(), "Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for statement in STATEMENTS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "statement would fail on rerun: {statement}"
            );
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn apply_twice() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = super::super::create_pool(&url).await.expect("pool");

        apply(&pool).await.expect("first apply");
        apply(&pool).await.expect("second apply");
    }
}
