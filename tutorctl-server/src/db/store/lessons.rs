//! Lesson with invoices

use tracing::debug;

use crate::models::{CreateLessonWithInvoices, LessonWithInvoices};

use super::{DbError, PgStore};

impl PgStore {
    /// Insert a lesson and one invoice per line item, in input order.
    ///
    /// Any failing insert rolls back the lesson and every invoice written
    /// before it.
    pub async fn create_lesson_with_invoices(
        &self,
        input: CreateLessonWithInvoices,
    ) -> Result<LessonWithInvoices, DbError> {
        debug!(invoices = input.invoices.len(), "creating lesson with invoices");

        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let lesson = q.create_lesson(&input.lesson).await?;

                let mut invoices = Vec::with_capacity(input.invoices.len());
                for item in input.invoices {
                    let params = item.into_params(lesson.lesson_id);
                    invoices.push(q.create_invoice(&params).await?);
                }

                Ok(LessonWithInvoices { lesson, invoices })
            })
        })
        .await
    }

    pub async fn get_lesson_with_invoices(
        &self,
        lesson_id: i64,
    ) -> Result<LessonWithInvoices, DbError> {
        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let lesson = q.get_lesson(lesson_id).await?;
                let invoices = q.list_invoices_by_lesson(lesson_id).await?;
                Ok(LessonWithInvoices { lesson, invoices })
            })
        })
        .await
    }

    /// Remove a lesson's invoices, then the lesson. A missing lesson is not an
    /// error.
    pub async fn delete_lesson_with_invoices(&self, lesson_id: i64) -> Result<(), DbError> {
        self.exec_tx(move |mut q| {
            Box::pin(async move {
                let removed = q.delete_invoices_by_lesson(lesson_id).await?;
                q.delete_lesson(lesson_id).await?;
                debug!(lesson_id, invoices = removed, "deleted lesson with invoices");
                Ok(())
            })
        })
        .await
    }
}
