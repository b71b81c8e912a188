//! User operations

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewUser, User, UserUpdate};

use super::Database;

const USER_COLUMNS: &str =
    "id, email, username, password_hash, role, registered_at, last_login_at";

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// A taken email is rejected by the UNIQUE constraint as `Duplicate`.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, password_hash, role, registered_at, last_login_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(e, format!("Email '{}' is already registered", user.email))
        })?;

        Ok(User {
            id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            registered_at: now,
            last_login_at: None,
        })
    }

    /// Get a user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user matching both email and username
    pub async fn find_user_by_login(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DbError> {
        let result = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? AND username = ? LIMIT 1"
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY registered_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Update the provided identity fields, leaving the rest untouched
    pub async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, DbError> {
        let email = update.email.clone();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = COALESCE(?, email),
                username = COALESCE(?, username),
                role = COALESCE(?, role)
            WHERE id = ?
            "#,
        )
        .bind(update.email)
        .bind(update.username)
        .bind(update.role)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(
                e,
                format!(
                    "Email '{}' is already registered",
                    email.unwrap_or_default()
                ),
            )
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the last-login timestamp
    pub async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(at.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user
    pub async fn delete_user(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}
