//! Payment queries

use crate::models::{Pagination, Payment, PaymentParams};

use super::{expect_row, DbError, Queries};

impl Queries<'_> {
    pub async fn create_payment(&mut self, params: &PaymentParams) -> Result<Payment, DbError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (receipt_id, payment_datetime, amount, payment_method_id)
            VALUES ($1, $2, $3, $4)
            RETURNING payment_id, receipt_id, payment_datetime, amount, payment_method_id
            "#,
        )
        .bind(params.receipt_id)
        .bind(params.payment_datetime)
        .bind(params.amount)
        .bind(params.payment_method_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(payment)
    }

    pub async fn get_payment(&mut self, payment_id: i64) -> Result<Payment, DbError> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, receipt_id, payment_datetime, amount, payment_method_id
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::not_found("payment", payment_id))
    }

    pub async fn list_payments(&mut self, page: Pagination) -> Result<Vec<Payment>, DbError> {
        let rows = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, receipt_id, payment_datetime, amount, payment_method_id
            FROM payments
            ORDER BY payment_datetime, payment_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    /// All payments on a receipt in insertion order.
    pub async fn list_payments_by_receipt(
        &mut self,
        receipt_id: i64,
    ) -> Result<Vec<Payment>, DbError> {
        let rows = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, receipt_id, payment_datetime, amount, payment_method_id
            FROM payments
            WHERE receipt_id = $1
            ORDER BY payment_id
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    pub async fn update_payment(
        &mut self,
        payment_id: i64,
        params: &PaymentParams,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET receipt_id = $2, payment_datetime = $3, amount = $4, payment_method_id = $5
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .bind(params.receipt_id)
        .bind(params.payment_datetime)
        .bind(params.amount)
        .bind(params.payment_method_id)
        .execute(&mut *self.conn)
        .await?;
        expect_row(result, "payment", payment_id)
    }

    pub async fn delete_payment(&mut self, payment_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM payments WHERE payment_id = $1")
            .bind(payment_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    /// Returns the number of payments removed.
    pub async fn delete_payments_by_receipt(&mut self, receipt_id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM payments WHERE receipt_id = $1")
            .bind(receipt_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }
}
