//! Core error types

use rolegate_auth::AuthError;
use rolegate_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => CoreError::Conflict(msg),
            DbError::NotFound(msg) => CoreError::NotFound(msg),
            other => CoreError::Database(other),
        }
    }
}
