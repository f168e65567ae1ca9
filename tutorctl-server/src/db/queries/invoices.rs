//! Invoice queries

use crate::models::{Invoice, InvoiceParams, Pagination};

use super::{expect_row, DbError, Queries};

const INVOICE_COLUMNS: &str = "invoice_id, student_id, lesson_id, invoice_datetime, \
     hourly_fee, duration, discount, amount, notes";

impl Queries<'_> {
    /// Insert an invoice; a `None` datetime is stamped with `NOW()`.
    pub async fn create_invoice(&mut self, params: &InvoiceParams) -> Result<Invoice, DbError> {
        let sql = format!(
            r#"
            INSERT INTO invoices (
                student_id, lesson_id, invoice_datetime,
                hourly_fee, duration, discount, amount, notes
            )
            VALUES ($1, $2, COALESCE($3, NOW()), $4, $5, $6, $7, $8)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(params.student_id)
            .bind(params.lesson_id)
            .bind(params.invoice_datetime)
            .bind(params.hourly_fee)
            .bind(params.duration)
            .bind(params.discount)
            .bind(params.amount)
            .bind(params.notes.as_deref())
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(invoice)
    }

    pub async fn get_invoice(&mut self, invoice_id: i64) -> Result<Invoice, DbError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_id = $1");

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(invoice_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| DbError::not_found("invoice", invoice_id))
    }

    pub async fn list_invoices(&mut self, page: Pagination) -> Result<Vec<Invoice>, DbError> {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            ORDER BY student_id, invoice_datetime, invoice_id
            LIMIT $1 OFFSET $2
            "#
        );

        let rows = sqlx::query_as::<_, Invoice>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// All invoices for a lesson in insertion order.
    pub async fn list_invoices_by_lesson(
        &mut self,
        lesson_id: i64,
    ) -> Result<Vec<Invoice>, DbError> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE lesson_id = $1 ORDER BY invoice_id"
        );

        let rows = sqlx::query_as::<_, Invoice>(&sql)
            .bind(lesson_id)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn list_invoices_by_student(
        &mut self,
        student_id: i64,
        page: Pagination,
    ) -> Result<Vec<Invoice>, DbError> {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE student_id = $1
            ORDER BY invoice_datetime, invoice_id
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, Invoice>(&sql)
            .bind(student_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// Full-row replace. A `None` datetime keeps the stored one.
    pub async fn update_invoice(
        &mut self,
        invoice_id: i64,
        params: &InvoiceParams,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET student_id = $2,
                lesson_id = $3,
                invoice_datetime = COALESCE($4, invoice_datetime),
                hourly_fee = $5,
                duration = $6,
                discount = $7,
                amount = $8,
                notes = $9
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .bind(params.student_id)
        .bind(params.lesson_id)
        .bind(params.invoice_datetime)
        .bind(params.hourly_fee)
        .bind(params.duration)
        .bind(params.discount)
        .bind(params.amount)
        .bind(params.notes.as_deref())
        .execute(&mut *self.conn)
        .await?;
        expect_row(result, "invoice", invoice_id)
    }

    pub async fn delete_invoice(&mut self, invoice_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM invoices WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    /// Returns the number of invoices removed.
    pub async fn delete_invoices_by_lesson(&mut self, lesson_id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM invoices WHERE lesson_id = $1")
            .bind(lesson_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }
}
