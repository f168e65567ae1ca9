//! Store: the pool owner and transaction coordinator
//!
//! [`PgStore`] is constructed once at startup and shared by every request.
//! Single-statement operations run through [`PgStore::exec`] on a pooled
//! connection; composite operations run through [`PgStore::exec_tx`], which
//! hands the closure a transaction-scoped [`Queries`] and commits or rolls
//! back based on its result.

mod lessons;
mod receipts;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::PgPool;
use tracing::warn;

use crate::models::{Pagination, Reference, ReferenceName, Student, StudentParams};

use super::{DbError, Queries};

/// Operations the HTTP layer depends on.
///
/// [`PgStore`] is the production implementation; tests use
/// [`crate::testing::MemoryStore`].
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn create_reference<R: Reference>(&self, name: ReferenceName) -> Result<R, DbError>;

    async fn get_reference<R: Reference>(&self, id: i64) -> Result<R, DbError>;

    async fn list_references<R: Reference>(&self, page: Pagination) -> Result<Vec<R>, DbError>;

    async fn update_reference<R: Reference>(
        &self,
        id: i64,
        name: ReferenceName,
    ) -> Result<(), DbError>;

    async fn delete_reference<R: Reference>(&self, id: i64) -> Result<(), DbError>;

    async fn create_student(&self, params: StudentParams) -> Result<Student, DbError>;

    async fn get_student(&self, student_id: i64) -> Result<Student, DbError>;

    async fn list_students(&self, page: Pagination) -> Result<Vec<Student>, DbError>;

    async fn update_student(&self, student_id: i64, params: StudentParams)
        -> Result<(), DbError>;

    async fn delete_student(&self, student_id: i64) -> Result<(), DbError>;
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `f` on a pooled connection. Each statement autocommits.
    pub async fn exec<T, F>(&self, f: F) -> Result<T, DbError>
    where
        T: Send,
        F: for<'q> FnOnce(Queries<'q>) -> BoxFuture<'q, Result<T, DbError>> + Send,
    {
        let mut conn = self.pool.acquire().await?;
        f(Queries::new(&mut *conn)).await
    }

    /// Run `f` inside one transaction.
    ///
    /// `Ok` commits. `Err` rolls back and returns the error; if the rollback
    /// fails as well the result is [`DbError::Transaction`] carrying both.
    /// If the returned future is dropped before completion, the transaction
    /// is rolled back when it is dropped.
    pub async fn exec_tx<T, F>(&self, f: F) -> Result<T, DbError>
    where
        T: Send,
        F: for<'q> FnOnce(Queries<'q>) -> BoxFuture<'q, Result<T, DbError>> + Send,
    {
        let mut tx = self.pool.begin().await?;

        match f(Queries::new(&mut *tx)).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => {
                    warn!(error = %err, "transaction rolled back");
                    Err(err)
                }
                Err(rollback) => {
                    warn!(error = %err, rollback_error = %rollback, "transaction rollback failed");
                    Err(DbError::rollback_failed(err, rollback))
                }
            },
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_reference<R: Reference>(&self, name: ReferenceName) -> Result<R, DbError> {
        self.exec(move |mut q| Box::pin(async move { q.create_reference::<R>(&name).await }))
            .await
    }

    async fn get_reference<R: Reference>(&self, id: i64) -> Result<R, DbError> {
        self.exec(move |mut q| Box::pin(async move { q.get_reference::<R>(id).await }))
            .await
    }

    async fn list_references<R: Reference>(&self, page: Pagination) -> Result<Vec<R>, DbError> {
        self.exec(move |mut q| Box::pin(async move { q.list_references::<R>(page).await }))
            .await
    }

    async fn update_reference<R: Reference>(
        &self,
        id: i64,
        name: ReferenceName,
    ) -> Result<(), DbError> {
        self.exec(move |mut q| {
            Box::pin(async move { q.update_reference::<R>(id, &name).await })
        })
        .await
    }

    async fn delete_reference<R: Reference>(&self, id: i64) -> Result<(), DbError> {
        self.exec(move |mut q| Box::pin(async move { q.delete_reference::<R>(id).await }))
            .await
    }

    async fn create_student(&self, params: StudentParams) -> Result<Student, DbError> {
        self.exec(move |mut q| Box::pin(async move { q.create_student(&params).await }))
            .await
    }

    async fn get_student(&self, student_id: i64) -> Result<Student, DbError> {
        self.exec(move |mut q| Box::pin(async move { q.get_student(student_id).await }))
            .await
    }

    async fn list_students(&self, page: Pagination) -> Result<Vec<Student>, DbError> {
        self.exec(move |mut q| Box::pin(async move { q.list_students(page).await }))
            .await
    }

    async fn update_student(
        &self,
        student_id: i64,
        params: StudentParams,
    ) -> Result<(), DbError> {
        self.exec(move |mut q| {
            Box::pin(async move { q.update_student(student_id, &params).await })
        })
        .await
    }

    async fn delete_student(&self, student_id: i64) -> Result<(), DbError> {
        self.exec(move |mut q| Box::pin(async move { q.delete_student(student_id).await }))
            .await
    }
}
