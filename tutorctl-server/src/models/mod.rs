//! Domain models with validation at construction
//!
//! Row types derive `sqlx::FromRow` and `serde` so the same struct is read
//! from Postgres and written to HTTP responses. User input goes through the
//! validated constructors here; invalid input returns `ValidationError`.

pub mod validation;
pub mod name;
pub mod pagination;
pub mod reference;
pub mod student;
pub mod lesson;
pub mod receipt;

pub use validation::ValidationError;
pub use name::{PersonName, ReferenceName};
pub use pagination::{PageParams, Pagination};
pub use reference::{College, Funnel, LessonLocation, LessonSubject, PaymentMethod, Reference, ReferenceKind};
pub use student::{Student, StudentInput, StudentParams};
pub use lesson::{
    CreateLessonWithInvoices, Invoice, InvoiceLineItem, InvoiceParams, Lesson, LessonParams,
    LessonWithInvoices,
};
pub use receipt::{
    CreateReceiptWithPayments, Payment, PaymentLineItem, PaymentParams, Receipt, ReceiptParams,
    ReceiptWithPayments, StudentReceiptsWithPayments, UpdateReceiptWithPayments,
};
