//! Database error type

/// Errors surfaced by the query executor and the store
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Foreign key, unique or check constraint rejected the write
    #[error("constraint violation on {constraint}: {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// A composite operation failed and its rollback failed too
    #[error("transaction error: {source}; rollback error: {rollback}")]
    Transaction {
        source: Box<DbError>,
        rollback: sqlx::Error,
    },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Combine the error that aborted a transaction with the error raised
    /// while rolling it back.
    pub fn rollback_failed(source: DbError, rollback: sqlx::Error) -> Self {
        Self::Transaction {
            source: Box::new(source),
            rollback,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_foreign_key_violation() || db.is_unique_violation() || db.is_check_violation()
            {
                return Self::ConstraintViolation {
                    constraint: db.constraint().unwrap_or("unknown").to_owned(),
                    message: db.message().to_owned(),
                };
            }
        }
        Self::Sqlx(e)
    }
}
