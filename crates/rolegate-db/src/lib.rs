//! rolegate credential store
//!
//! This crate provides the persistence layer for users and roles:
//! the `CredentialStore` contract and its SQLite implementation via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use store::CredentialStore;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
