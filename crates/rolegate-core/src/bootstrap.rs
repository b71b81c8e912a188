//! Startup seeding of baseline roles and the first administrator

use rolegate_auth::hash_password;
use rolegate_db::{CredentialStore, DbError, NewUser, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::accounts::DEFAULT_ROLE;
use crate::error::CoreError;
use crate::permissions;

/// Bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Role seeded with every known permission
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_admin_role() -> String {
    "admin".to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            admin_email: None,
            admin_username: None,
            admin_password: None,
        }
    }
}

/// Create a role unless one with that name already exists
async fn ensure_role(store: &dyn CredentialStore, role: Role) -> Result<(), CoreError> {
    if store.get_role(&role.name).await?.is_some() {
        return Ok(());
    }

    let name = role.name.clone();
    match store.insert_role(role).await {
        Ok(_) => {
            info!("Seeded role {}", name);
            Ok(())
        }
        // Another instance seeded it first
        Err(DbError::Duplicate(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Seed the default and admin roles, and the first admin user when the
/// store is empty and admin credentials are configured
///
/// Existing roles are never modified.
pub async fn seed(store: &dyn CredentialStore, config: &BootstrapConfig) -> Result<(), CoreError> {
    ensure_role(store, Role::new(DEFAULT_ROLE, Vec::<String>::new())).await?;
    ensure_role(store, Role::new(config.admin_role.clone(), permissions::ALL.iter().copied())).await?;

    if store.has_users().await? {
        return Ok(());
    }

    let credentials = (
        config.admin_email.as_deref().filter(|v| !v.is_empty()),
        config.admin_username.as_deref().filter(|v| !v.is_empty()),
        config.admin_password.as_deref().filter(|v| !v.is_empty()),
    );
    let (Some(email), Some(username), Some(password)) = credentials else {
        warn!("No users exist and no bootstrap admin is configured");
        return Ok(());
    };

    let password_hash = hash_password(password)?;
    store
        .insert_user(NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            role: config.admin_role.clone(),
        })
        .await?;

    info!("Created bootstrap admin user {} with role {}", username, config.admin_role);
    Ok(())
}
