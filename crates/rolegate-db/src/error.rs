//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

impl DbError {
    /// Map a sqlx error, turning unique-constraint violations into `Duplicate`
    pub(crate) fn from_write(err: sqlx::Error, what: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return DbError::Duplicate(what.into());
        }
        DbError::Connection(err)
    }
}
