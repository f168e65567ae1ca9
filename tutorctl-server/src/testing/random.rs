//! Random test data

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{
    CreateLessonWithInvoices, CreateReceiptWithPayments, Invoice, InvoiceLineItem, LessonParams,
    PaymentLineItem, ReferenceName, StudentInput,
};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// 2020-01-01T00:00:00Z
const EPOCH_START: i64 = 1_577_836_800;
/// 2026-01-01T00:00:00Z
const EPOCH_END: i64 = 1_767_225_600;

/// Seedable generator for test values.
///
/// Construct one per test; the same seed yields the same sequence.
#[derive(Debug, Clone)]
pub struct RandomGen {
    rng: StdRng,
}

impl RandomGen {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Integer in `min..=max`.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        self.rng.gen_range(min..=max)
    }

    /// Float in `min..=max`.
    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..=max)
    }

    /// Lowercase ASCII string of `len` letters.
    pub fn string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    pub fn name(&mut self) -> String {
        self.string(8)
    }

    pub fn reference_name(&mut self) -> ReferenceName {
        ReferenceName(self.string(12))
    }

    pub fn email(&mut self) -> String {
        format!("{}@gmail.com", self.string(10))
    }

    pub fn phone_number(&mut self) -> String {
        format!(
            "+{} {}-{}",
            self.int(100, 999),
            self.int(1000, 9999),
            self.int(1000, 9999)
        )
    }

    pub fn address(&mut self) -> String {
        format!(
            "street {} {}, {} {}, {}",
            self.string(8),
            self.int(10, 99),
            self.string(8),
            self.int(10000, 99999),
            self.string(8)
        )
    }

    pub fn note(&mut self) -> String {
        self.string(24)
    }

    /// Whole-second timestamp so it survives a database round trip unchanged.
    pub fn datetime(&mut self) -> DateTime<Utc> {
        let secs = self.int(EPOCH_START, EPOCH_END);
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }

    /// Lesson length in minutes.
    pub fn lesson_duration(&mut self) -> i64 {
        *[30, 45, 60, 90, 120].choose(&mut self.rng).unwrap_or(&60)
    }

    pub fn discount(&mut self) -> f64 {
        *[0.0, 0.1, 0.25, 0.5].choose(&mut self.rng).unwrap_or(&0.0)
    }

    /// Whole-unit fee so sums compare exactly.
    pub fn hourly_fee(&mut self) -> f64 {
        self.int(20, 200) as f64
    }

    /// Whole-unit amount so sums compare exactly.
    pub fn payment_amount(&mut self) -> f64 {
        self.int(10, 500) as f64
    }

    /// A complete, valid student body with no college or funnel.
    pub fn student_input(&mut self) -> StudentInput {
        StudentInput {
            first_name: Some(self.name()),
            last_name: Some(self.name()),
            email: Some(self.email()),
            phone_number: Some(self.phone_number()),
            address: Some(self.address()),
            college_id: None,
            funnel_id: None,
            hourly_fee: Some(self.hourly_fee()),
            notes: Some(self.note()),
        }
    }

    pub fn lesson_params(&mut self, location_id: i64, subject_id: i64) -> LessonParams {
        LessonParams {
            lesson_datetime: self.datetime(),
            duration: self.lesson_duration(),
            location_id,
            subject_id,
            notes: Some(self.note()),
        }
    }

    /// One invoice per student, priced from the generated fee and discount.
    pub fn lesson_with_invoices(
        &mut self,
        location_id: i64,
        subject_id: i64,
        student_ids: &[i64],
    ) -> CreateLessonWithInvoices {
        let lesson = self.lesson_params(location_id, subject_id);
        let invoices = student_ids
            .iter()
            .map(|&student_id| {
                let hourly_fee = self.hourly_fee();
                let discount = self.discount();
                InvoiceLineItem {
                    student_id,
                    hourly_fee,
                    duration: lesson.duration,
                    discount,
                    amount: Invoice::expected_amount(hourly_fee, lesson.duration, discount),
                    notes: None,
                }
            })
            .collect();
        CreateLessonWithInvoices { lesson, invoices }
    }

    pub fn payment_line_item(&mut self, payment_method_id: i64) -> PaymentLineItem {
        PaymentLineItem {
            payment_datetime: self.datetime(),
            amount: self.payment_amount(),
            payment_method_id,
        }
    }

    pub fn receipt_with_payments(
        &mut self,
        student_id: i64,
        payment_method_id: i64,
        payments: usize,
    ) -> CreateReceiptWithPayments {
        CreateReceiptWithPayments {
            student_id,
            receipt_datetime: self.datetime(),
            notes: Some(self.note()),
            payments: (0..payments)
                .map(|_| self.payment_line_item(payment_method_id))
                .collect(),
        }
    }
}
