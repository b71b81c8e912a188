//! Role registry operations

use rolegate_db::{CredentialStore, Role};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CoreError;

/// CRUD over role -> permission-set records
pub struct RoleRegistry {
    store: Arc<dyn CredentialStore>,
}

fn permission_set(permissions: Vec<String>) -> Result<BTreeSet<String>, CoreError> {
    if permissions.iter().any(|p| p.is_empty()) {
        return Err(CoreError::Validation(
            "Permission names cannot be empty".to_string(),
        ));
    }
    Ok(permissions.into_iter().collect())
}

fn required_permission(permission: Option<String>) -> Result<String, CoreError> {
    permission
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CoreError::Validation("Missing required field (permission)".to_string()))
}

fn role_not_found(name: &str) -> CoreError {
    CoreError::NotFound(format!("Role not found: {}", name))
}

impl RoleRegistry {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// List all roles and their permissions
    pub async fn list_roles(&self) -> Result<Vec<Role>, CoreError> {
        Ok(self.store.list_roles().await?)
    }

    /// Create a role keyed by its name
    ///
    /// An existing role with the same name is left untouched and the call
    /// fails with `Conflict`.
    pub async fn create_role(
        &self,
        name: Option<String>,
        permissions: Option<Vec<String>>,
    ) -> Result<Role, CoreError> {
        let name = name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CoreError::Validation("Missing required field (role_name)".to_string()))?;
        let permissions = permission_set(permissions.unwrap_or_default())?;

        let role = self.store.insert_role(Role { name, permissions }).await?;
        info!("Created role {} with {} permissions", role.name, role.permissions.len());
        Ok(role)
    }

    /// Replace a role's whole permission set
    pub async fn replace_permissions(
        &self,
        name: &str,
        permissions: Option<Vec<String>>,
    ) -> Result<(), CoreError> {
        let permissions = permissions
            .ok_or_else(|| CoreError::Validation("Missing required field (permissions)".to_string()))
            .and_then(permission_set)?;

        if !self.store.replace_permissions(name, permissions).await? {
            return Err(role_not_found(name));
        }
        info!("Replaced permissions of role {}", name);
        Ok(())
    }

    /// Delete a role; deleting an absent role is not an error
    ///
    /// Users referencing the role keep the name and resolve to no permissions.
    pub async fn delete_role(&self, name: &str) -> Result<(), CoreError> {
        if self.store.delete_role(name).await? {
            info!("Deleted role {}", name);
        } else {
            debug!("Delete requested for absent role {}", name);
        }
        Ok(())
    }

    /// Grant one permission to a role; granting it twice is a no-op
    pub async fn add_permission(
        &self,
        name: &str,
        permission: Option<String>,
    ) -> Result<(), CoreError> {
        let permission = required_permission(permission)?;
        if !self.store.add_permission(name, &permission).await? {
            return Err(role_not_found(name));
        }
        info!("Added permission {} to role {}", permission, name);
        Ok(())
    }

    /// Revoke one permission from a role; revoking an absent one is a no-op
    pub async fn remove_permission(
        &self,
        name: &str,
        permission: Option<String>,
    ) -> Result<(), CoreError> {
        let permission = required_permission(permission)?;
        if !self.store.remove_permission(name, &permission).await? {
            return Err(role_not_found(name));
        }
        info!("Removed permission {} from role {}", permission, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_db::Database;

    async fn registry() -> RoleRegistry {
        RoleRegistry::new(Arc::new(Database::in_memory().await.unwrap()))
    }

    fn perms(names: &[&str]) -> Option<Vec<String>> {
        Some(names.iter().map(|n| n.to_string()).collect())
    }

    async fn permissions_of(registry: &RoleRegistry, name: &str) -> BTreeSet<String> {
        registry
            .list_roles()
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.name == name)
            .map(|r| r.permissions)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_role_defaults_to_empty() {
        let registry = registry().await;
        let role = registry
            .create_role(Some("viewer".to_string()), None)
            .await
            .unwrap();
        assert!(role.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_create_role_conflict_keeps_original() {
        let registry = registry().await;
        registry
            .create_role(Some("editor".to_string()), perms(&["getUser"]))
            .await
            .unwrap();

        let second = registry
            .create_role(Some("editor".to_string()), perms(&["deleteUser"]))
            .await;
        assert!(matches!(second, Err(CoreError::Conflict(_))));
        assert_eq!(
            permissions_of(&registry, "editor").await,
            perms(&["getUser"]).unwrap().into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_create_role_validation() {
        let registry = registry().await;
        assert!(matches!(
            registry.create_role(None, None).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            registry
                .create_role(Some("editor".to_string()), perms(&["getUser", ""]))
                .await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_add_permission_twice_equals_once() {
        let registry = registry().await;
        registry
            .create_role(Some("editor".to_string()), perms(&["getUser"]))
            .await
            .unwrap();

        registry
            .add_permission("editor", Some("deleteUser".to_string()))
            .await
            .unwrap();
        let once = permissions_of(&registry, "editor").await;

        registry
            .add_permission("editor", Some("deleteUser".to_string()))
            .await
            .unwrap();
        assert_eq!(permissions_of(&registry, "editor").await, once);
    }

    #[tokio::test]
    async fn test_remove_absent_permission_is_noop() {
        let registry = registry().await;
        registry
            .create_role(Some("editor".to_string()), perms(&["getUser"]))
            .await
            .unwrap();

        registry
            .remove_permission("editor", Some("deleteUser".to_string()))
            .await
            .unwrap();
        assert_eq!(
            permissions_of(&registry, "editor").await,
            perms(&["getUser"]).unwrap().into_iter().collect()
        );
    }

    #[tokio::test]
    async fn test_missing_role_is_not_found() {
        let registry = registry().await;
        assert!(matches!(
            registry.add_permission("ghost", Some("getUser".to_string())).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            registry.remove_permission("ghost", Some("getUser".to_string())).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            registry.replace_permissions("ghost", perms(&[])).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_permission_field_required() {
        let registry = registry().await;
        registry
            .create_role(Some("editor".to_string()), None)
            .await
            .unwrap();
        assert!(matches!(
            registry.add_permission("editor", None).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            registry.replace_permissions("editor", None).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let registry = registry().await;
        registry
            .create_role(Some("editor".to_string()), perms(&["getUser"]))
            .await
            .unwrap();

        registry
            .replace_permissions("editor", perms(&["addRol", "deleteRol"]))
            .await
            .unwrap();
        assert_eq!(permissions_of(&registry, "editor").await.len(), 2);

        registry.delete_role("editor").await.unwrap();
        registry.delete_role("editor").await.unwrap();
        assert!(registry.list_roles().await.unwrap().is_empty());
    }
}
