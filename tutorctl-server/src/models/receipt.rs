//! Receipts and the payments they group

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Receipt record from database.
///
/// `amount` equals the sum of the receipt's payments whenever the receipt
/// was written through a composite store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub receipt_id: i64,
    pub student_id: i64,
    pub receipt_datetime: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
}

/// Receipt fields for insert or full-row update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptParams {
    pub student_id: i64,
    pub receipt_datetime: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
}

/// Payment record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: i64,
    pub receipt_id: i64,
    pub payment_datetime: DateTime<Utc>,
    pub amount: f64,
    pub payment_method_id: i64,
}

/// Payment fields for insert or full-row update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentParams {
    pub receipt_id: i64,
    pub payment_datetime: DateTime<Utc>,
    pub amount: f64,
    pub payment_method_id: i64,
}

/// One payment within a receipt-with-payments create or update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLineItem {
    pub payment_datetime: DateTime<Utc>,
    pub amount: f64,
    pub payment_method_id: i64,
}

impl PaymentLineItem {
    pub fn into_params(self, receipt_id: i64) -> PaymentParams {
        PaymentParams {
            receipt_id,
            payment_datetime: self.payment_datetime,
            amount: self.amount,
            payment_method_id: self.payment_method_id,
        }
    }
}

/// Input for creating a receipt together with its payments.
///
/// There is no amount field: the receipt amount is derived from the
/// payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReceiptWithPayments {
    pub student_id: i64,
    pub receipt_datetime: DateTime<Utc>,
    pub notes: Option<String>,
    pub payments: Vec<PaymentLineItem>,
}

/// Input for replacing a receipt and its whole payment set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReceiptWithPayments {
    pub receipt_id: i64,
    pub student_id: i64,
    pub receipt_datetime: DateTime<Utc>,
    pub notes: Option<String>,
    pub payments: Vec<PaymentLineItem>,
}

/// A receipt and its payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptWithPayments {
    pub receipt: Receipt,
    pub payments: Vec<Payment>,
}

impl ReceiptWithPayments {
    /// Sum of payment amounts, in payment order.
    pub fn payments_total(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

/// One page of a student's receipts, each with its payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReceiptsWithPayments {
    pub student_id: i64,
    pub receipts_with_payments: Vec<ReceiptWithPayments>,
}
