use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Repository call exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return DomainError::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return DomainError::ForeignKeyViolation(constraint);
            }
        }
        DomainError::Database(err)
    }
}
