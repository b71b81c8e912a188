//! Database repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::info;

use crate::error::DbError;
use crate::models::{NewUser, Role, User, UserUpdate};
use crate::store::CredentialStore;

// Submodules
mod roles;
mod users;

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let pool = SqlitePool::connect(database_url).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open a private in-memory database
    ///
    /// The pool holds a single connection that never expires, so the
    /// database lives exactly as long as this handle and its clones.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                registered_at TEXT NOT NULL,
                last_login_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::Migration(format!("users table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_users_email_username ON users(email, username)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::Migration(format!("users index: {}", e)))?;

        // Permissions are kept as a JSON array document per role
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS roles (
                name TEXT PRIMARY KEY,
                permissions TEXT NOT NULL DEFAULT '[]'
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::Migration(format!("roles table: {}", e)))?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for Database {
    async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        Database::insert_user(self, user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        Database::find_user_by_email(self, email).await
    }

    async fn find_user_by_login(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DbError> {
        Database::find_user_by_login(self, email, username).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, DbError> {
        Database::get_user(self, id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        Database::list_users(self).await
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, DbError> {
        Database::update_user(self, id, update).await
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<bool, DbError> {
        Database::record_login(self, id, at).await
    }

    async fn delete_user(&self, id: &str) -> Result<bool, DbError> {
        Database::delete_user(self, id).await
    }

    async fn has_users(&self) -> Result<bool, DbError> {
        Database::has_users(self).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        Database::list_roles(self).await
    }

    async fn get_role(&self, name: &str) -> Result<Option<Role>, DbError> {
        Database::get_role(self, name).await
    }

    async fn insert_role(&self, role: Role) -> Result<Role, DbError> {
        Database::insert_role(self, role).await
    }

    async fn replace_permissions(
        &self,
        name: &str,
        permissions: BTreeSet<String>,
    ) -> Result<bool, DbError> {
        Database::replace_permissions(self, name, &permissions).await
    }

    async fn add_permission(&self, name: &str, permission: &str) -> Result<bool, DbError> {
        Database::add_permission(self, name, permission).await
    }

    async fn remove_permission(&self, name: &str, permission: &str) -> Result<bool, DbError> {
        Database::remove_permission(self, name, permission).await
    }

    async fn delete_role(&self, name: &str) -> Result<bool, DbError> {
        Database::delete_role(self, name).await
    }
}
