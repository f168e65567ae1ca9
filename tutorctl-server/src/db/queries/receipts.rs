//! Receipt queries

use crate::models::{Pagination, Receipt, ReceiptParams};

use super::{expect_row, DbError, Queries};

impl Queries<'_> {
    pub async fn create_receipt(&mut self, params: &ReceiptParams) -> Result<Receipt, DbError> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            INSERT INTO receipts (student_id, receipt_datetime, amount, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING receipt_id, student_id, receipt_datetime, amount, notes
            "#,
        )
        .bind(params.student_id)
        .bind(params.receipt_datetime)
        .bind(params.amount)
        .bind(params.notes.as_deref())
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(receipt)
    }

    pub async fn get_receipt(&mut self, receipt_id: i64) -> Result<Receipt, DbError> {
        sqlx::query_as::<_, Receipt>(
            r#"
            SELECT receipt_id, student_id, receipt_datetime, amount, notes
            FROM receipts
            WHERE receipt_id = $1
            "#,
        )
        .bind(receipt_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::not_found("receipt", receipt_id))
    }

    pub async fn list_receipts(&mut self, page: Pagination) -> Result<Vec<Receipt>, DbError> {
        let rows = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT receipt_id, student_id, receipt_datetime, amount, notes
            FROM receipts
            ORDER BY receipt_datetime, receipt_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    pub async fn list_receipts_by_student(
        &mut self,
        student_id: i64,
        page: Pagination,
    ) -> Result<Vec<Receipt>, DbError> {
        let rows = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT receipt_id, student_id, receipt_datetime, amount, notes
            FROM receipts
            WHERE student_id = $1
            ORDER BY receipt_datetime, receipt_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(student_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    pub async fn update_receipt(
        &mut self,
        receipt_id: i64,
        params: &ReceiptParams,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE receipts
            SET student_id = $2, receipt_datetime = $3, amount = $4, notes = $5
            WHERE receipt_id = $1
            "#,
        )
        .bind(receipt_id)
        .bind(params.student_id)
        .bind(params.receipt_datetime)
        .bind(params.amount)
        .bind(params.notes.as_deref())
        .execute(&mut *self.conn)
        .await?;
        expect_row(result, "receipt", receipt_id)
    }

    /// Overwrite only the stored amount.
    pub async fn update_receipt_amount(
        &mut self,
        receipt_id: i64,
        amount: f64,
    ) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE receipts SET amount = $2 WHERE receipt_id = $1")
            .bind(receipt_id)
            .bind(amount)
            .execute(&mut *self.conn)
            .await?;
        expect_row(result, "receipt", receipt_id)
    }

    pub async fn delete_receipt(&mut self, receipt_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM receipts WHERE receipt_id = $1")
            .bind(receipt_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
