//! Credential store trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::error::DbError;
use crate::models::{NewUser, Role, User, UserUpdate};

/// Credential store trait
///
/// Async access to the `users` collection (keyed by a store-assigned id,
/// with secondary lookup by email) and the `roles` collection (keyed by
/// role name). Each single-record write is atomic; sequences of calls are not.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // ==================== Users ====================

    /// Insert a new user, assigning its id. Fails with `Duplicate` on an email collision.
    async fn insert_user(&self, user: NewUser) -> Result<User, DbError>;

    /// Find a user by email (exact, case-sensitive)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    /// Find a user whose email and username both match
    async fn find_user_by_login(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DbError>;

    /// Get a user by id
    async fn get_user(&self, id: &str) -> Result<Option<User>, DbError>;

    /// List all users
    async fn list_users(&self) -> Result<Vec<User>, DbError>;

    /// Apply a partial update; returns false when the user does not exist
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, DbError>;

    /// Record a successful login; returns false when the user does not exist
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<bool, DbError>;

    /// Delete a user; returns false when nothing was deleted
    async fn delete_user(&self, id: &str) -> Result<bool, DbError>;

    /// Check if any users exist
    async fn has_users(&self) -> Result<bool, DbError>;

    // ==================== Roles ====================

    /// List all roles
    async fn list_roles(&self) -> Result<Vec<Role>, DbError>;

    /// Get a role by name
    async fn get_role(&self, name: &str) -> Result<Option<Role>, DbError>;

    /// Insert a role keyed by its name. Fails with `Duplicate` if the name is taken.
    async fn insert_role(&self, role: Role) -> Result<Role, DbError>;

    /// Replace a role's whole permission set; returns false when the role does not exist
    async fn replace_permissions(
        &self,
        name: &str,
        permissions: BTreeSet<String>,
    ) -> Result<bool, DbError>;

    /// Add one permission (idempotent); returns false when the role does not exist
    async fn add_permission(&self, name: &str, permission: &str) -> Result<bool, DbError>;

    /// Remove one permission (idempotent); returns false when the role does not exist
    async fn remove_permission(&self, name: &str, permission: &str) -> Result<bool, DbError>;

    /// Delete a role; returns false when nothing was deleted
    async fn delete_role(&self, name: &str) -> Result<bool, DbError>;
}
