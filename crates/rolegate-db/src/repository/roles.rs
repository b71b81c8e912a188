//! Role operations

use std::collections::BTreeSet;

use crate::error::DbError;
use crate::models::{Role, encode_permissions};

use super::Database;

impl Database {
    // ==================== Role Operations ====================

    /// List all roles
    pub async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        let rows = sqlx::query("SELECT name, permissions FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Role::try_from).collect()
    }

    /// Get a role by name
    pub async fn get_role(&self, name: &str) -> Result<Option<Role>, DbError> {
        let result = sqlx::query("SELECT name, permissions FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        result.as_ref().map(Role::try_from).transpose()
    }

    /// Insert a new role keyed by its name
    pub async fn insert_role(&self, role: Role) -> Result<Role, DbError> {
        sqlx::query("INSERT INTO roles (name, permissions) VALUES (?, ?)")
            .bind(&role.name)
            .bind(encode_permissions(&role.permissions))
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from_write(e, format!("Role '{}' already exists", role.name)))?;

        Ok(role)
    }

    /// Replace the full permission set of a role
    pub async fn replace_permissions(
        &self,
        name: &str,
        permissions: &BTreeSet<String>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE roles SET permissions = ? WHERE name = ?")
            .bind(encode_permissions(permissions))
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a permission to a role
    ///
    /// Runs as a single statement so concurrent mutations of the same role
    /// are applied one after another instead of overwriting each other.
    pub async fn add_permission(&self, name: &str, permission: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET permissions = (
                SELECT json_group_array(value) FROM (
                    SELECT value FROM json_each(roles.permissions)
                    UNION
                    SELECT ?
                )
            )
            WHERE name = ?
            "#,
        )
        .bind(permission)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a permission from a role
    pub async fn remove_permission(&self, name: &str, permission: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET permissions = (
                SELECT json_group_array(value)
                FROM json_each(roles.permissions)
                WHERE value <> ?
            )
            WHERE name = ?
            "#,
        )
        .bind(permission)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a role
    pub async fn delete_role(&self, name: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM roles WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
