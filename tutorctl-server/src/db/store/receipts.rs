//! Receipt with payments
//!
//! The stored receipt amount is always recomputed from the payment rows
//! written in the same transaction, summed in input order.

use tracing::debug;

use crate::models::{
    CreateReceiptWithPayments, Pagination, Payment, PaymentLineItem, ReceiptParams,
    ReceiptWithPayments, StudentReceiptsWithPayments, UpdateReceiptWithPayments,
};

use super::{DbError, PgStore, Queries};

/// Insert `items` under `receipt_id` and return the rows with their total.
async fn insert_payments(
    q: &mut Queries<'_>,
    receipt_id: i64,
    items: Vec<PaymentLineItem>,
) -> Result<(Vec<Payment>, f64), DbError> {
    let mut payments = Vec::with_capacity(items.len());
    let mut total = 0.0;
    for item in items {
        let payment = q.create_payment(&item.into_params(receipt_id)).await?;
        total += payment.amount;
        payments.push(payment);
    }
    Ok((payments, total))
}

impl PgStore {
    /// Insert a receipt and its payments; the receipt amount becomes the sum
    /// of the payment amounts (0 when there are none).
    pub async fn create_receipt_with_payments(
        &self,
        input: CreateReceiptWithPayments,
    ) -> Result<ReceiptWithPayments, DbError> {
        debug!(
            student_id = input.student_id,
            payments = input.payments.len(),
            "creating receipt with payments"
        );

        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let params = ReceiptParams {
                    student_id: input.student_id,
                    receipt_datetime: input.receipt_datetime,
                    amount: 0.0,
                    notes: input.notes,
                };
                let mut receipt = q.create_receipt(&params).await?;

                let (payments, total) =
                    insert_payments(&mut q, receipt.receipt_id, input.payments).await?;
                q.update_receipt_amount(receipt.receipt_id, total).await?;
                receipt.amount = total;

                Ok(ReceiptWithPayments { receipt, payments })
            })
        })
        .await
    }

    pub async fn get_receipt_with_payments(
        &self,
        receipt_id: i64,
    ) -> Result<ReceiptWithPayments, DbError> {
        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let receipt = q.get_receipt(receipt_id).await?;
                let payments = q.list_payments_by_receipt(receipt_id).await?;
                Ok(ReceiptWithPayments { receipt, payments })
            })
        })
        .await
    }

    /// Replace a receipt's fields and its whole payment set.
    ///
    /// A missing receipt is `NotFound` and nothing is changed.
    pub async fn update_receipt_with_payments(
        &self,
        input: UpdateReceiptWithPayments,
    ) -> Result<ReceiptWithPayments, DbError> {
        debug!(
            receipt_id = input.receipt_id,
            payments = input.payments.len(),
            "replacing receipt payments"
        );

        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let receipt_id = input.receipt_id;
                let params = ReceiptParams {
                    student_id: input.student_id,
                    receipt_datetime: input.receipt_datetime,
                    amount: 0.0,
                    notes: input.notes,
                };
                q.update_receipt(receipt_id, &params).await?;
                q.delete_payments_by_receipt(receipt_id).await?;

                let (payments, total) = insert_payments(&mut q, receipt_id, input.payments).await?;
                q.update_receipt_amount(receipt_id, total).await?;

                let receipt = q.get_receipt(receipt_id).await?;
                Ok(ReceiptWithPayments { receipt, payments })
            })
        })
        .await
    }

    /// Remove a receipt's payments, then the receipt.
    pub async fn delete_receipt_with_payments(&self, receipt_id: i64) -> Result<(), DbError> {
        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let removed = q.delete_payments_by_receipt(receipt_id).await?;
                q.delete_receipt(receipt_id).await?;
                debug!(receipt_id, payments = removed, "deleted receipt with payments");
                Ok(())
            })
        })
        .await
    }

    /// One page of a student's receipts (by datetime, then id), each with
    /// its payments. An unknown student yields an empty page.
    pub async fn list_receipts_with_payments_by_student(
        &self,
        student_id: i64,
        page: Pagination,
    ) -> Result<StudentReceiptsWithPayments, DbError> {
        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let receipts = q.list_receipts_by_student(student_id, page).await?;

                let mut receipts_with_payments = Vec::with_capacity(receipts.len());
                for receipt in receipts {
                    let payments = q.list_payments_by_receipt(receipt.receipt_id).await?;
                    receipts_with_payments.push(ReceiptWithPayments { receipt, payments });
                }

                Ok(StudentReceiptsWithPayments {
                    student_id,
                    receipts_with_payments,
                })
            })
        })
        .await
    }
}
