//! Lessons and the invoices issued for them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lesson record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub lesson_id: i64,
    pub lesson_datetime: DateTime<Utc>,
    /// Minutes
    pub duration: i64,
    pub location_id: i64,
    pub subject_id: i64,
    pub notes: Option<String>,
}

/// Lesson fields for insert or full-row update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonParams {
    pub lesson_datetime: DateTime<Utc>,
    pub duration: i64,
    pub location_id: i64,
    pub subject_id: i64,
    pub notes: Option<String>,
}

/// Invoice record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: i64,
    pub student_id: i64,
    pub lesson_id: i64,
    pub invoice_datetime: DateTime<Utc>,
    pub hourly_fee: f64,
    pub duration: i64,
    /// Fraction in 0..=1
    pub discount: f64,
    pub amount: f64,
    pub notes: Option<String>,
}

impl Invoice {
    /// `hourly_fee * duration/60 * (1 - discount)`.
    ///
    /// Callers compute `amount` with this; the database stores whatever it
    /// is given.
    pub fn expected_amount(hourly_fee: f64, duration: i64, discount: f64) -> f64 {
        hourly_fee * duration as f64 / 60.0 * (1.0 - discount)
    }
}

/// Invoice fields for insert or full-row update.
///
/// `invoice_datetime` defaults to the insert time when `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceParams {
    pub student_id: i64,
    pub lesson_id: i64,
    pub invoice_datetime: Option<DateTime<Utc>>,
    pub hourly_fee: f64,
    pub duration: i64,
    pub discount: f64,
    pub amount: f64,
    pub notes: Option<String>,
}

/// One student's invoice within a lesson-with-invoices create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub student_id: i64,
    pub hourly_fee: f64,
    pub duration: i64,
    pub discount: f64,
    pub amount: f64,
    pub notes: Option<String>,
}

impl InvoiceLineItem {
    /// Bind this line item to the lesson it was issued for.
    pub fn into_params(self, lesson_id: i64) -> InvoiceParams {
        InvoiceParams {
            student_id: self.student_id,
            lesson_id,
            invoice_datetime: None,
            hourly_fee: self.hourly_fee,
            duration: self.duration,
            discount: self.discount,
            amount: self.amount,
            notes: self.notes,
        }
    }
}

/// Input for creating a lesson together with its invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLessonWithInvoices {
    #[serde(flatten)]
    pub lesson: LessonParams,
    pub invoices: Vec<InvoiceLineItem>,
}

/// A lesson and every invoice issued for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonWithInvoices {
    pub lesson: Lesson,
    pub invoices: Vec<Invoice>,
}
