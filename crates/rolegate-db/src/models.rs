//! Database models

use crate::error::DbError;
use crate::utils::{parse_datetime_or_now, parse_optional_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::BTreeSet;

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Key into the role registry; may name a role that no longer exists
    pub role: String,
    pub registered_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// New user for insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// Partial update of a user's identity fields
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.role.is_none()
    }
}

/// Named set of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub permissions: BTreeSet<String>,
}

impl Role {
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether this role grants a permission
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Decode a stored permission document into a set
///
/// Anything other than a JSON array of strings is rejected.
pub fn decode_permissions(role: &str, raw: &str) -> Result<BTreeSet<String>, DbError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| DbError::Malformed(format!("role '{}' permissions: {}", role, e)))?;

    let items = value.as_array().ok_or_else(|| {
        DbError::Malformed(format!("role '{}' permissions is not an array", role))
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                DbError::Malformed(format!(
                    "role '{}' contains a non-string permission: {}",
                    role, item
                ))
            })
        })
        .collect()
}

/// Encode a permission set for storage
pub fn encode_permissions(permissions: &BTreeSet<String>) -> String {
    serde_json::Value::from(permissions.iter().cloned().collect::<Vec<_>>()).to_string()
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            registered_at: parse_datetime_or_now(&row.try_get::<String, _>("registered_at")?),
            last_login_at: parse_optional_datetime(
                row.try_get::<Option<String>, _>("last_login_at")?.as_deref(),
            ),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Role {
    type Error = DbError;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let name: String = row.try_get("name")?;
        let raw: String = row.try_get("permissions")?;
        let permissions = decode_permissions(&name, &raw)?;
        Ok(Role { name, permissions })
    }
}
