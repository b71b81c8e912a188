//! Registration, login and user administration

use chrono::Utc;
use rolegate_auth::{JwtManager, hash_password, verify_password};
use rolegate_db::{CredentialStore, NewUser, User, UserUpdate};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Role given to users who register without naming one
pub const DEFAULT_ROLE: &str = "common_user";

/// Valid Argon2id digest that matches no password. Verified against when
/// no account matches so both failure paths cost the same hash work.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$cm9sZWdhdGUtZHVtbXktc2FsdA$0cqg2Wm2mXbjCZicnWnyFg";

const MISSING_FIELDS: &str = "Missing required fields (email, username, password)";

/// Registration input; absent or empty fields fail validation
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login input
#[derive(Debug, Clone, Default)]
pub struct LoginAttempt {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Token returned by a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Resolve the role for a new user
pub fn resolve_role(requested: Option<&str>) -> &str {
    requested.filter(|r| !r.is_empty()).unwrap_or(DEFAULT_ROLE)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Authentication handler and user administration
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    jwt: Arc<JwtManager>,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>, jwt: Arc<JwtManager>) -> Self {
        Self { store, jwt }
    }

    /// Register a new user. Does not issue a token.
    pub async fn register(&self, input: Registration) -> Result<User, CoreError> {
        let (Some(email), Some(username), Some(password)) = (
            non_empty(input.email),
            non_empty(input.username),
            non_empty(input.password),
        ) else {
            return Err(CoreError::Validation(MISSING_FIELDS.to_string()));
        };

        if self.store.find_user_by_email(&email).await?.is_some() {
            debug!("Registration rejected, email already in use");
            return Err(CoreError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| CoreError::Internal(format!("Hashing task failed: {}", e)))??;

        let user = self
            .store
            .insert_user(NewUser {
                email,
                username,
                password_hash,
                role: resolve_role(input.role.as_deref()).to_string(),
            })
            .await?;

        metrics::counter!("rolegate_registrations_total").increment(1);
        info!("Registered user {} ({}) with role {}", user.id, user.username, user.role);

        Ok(user)
    }

    /// Verify credentials and issue a token carrying the user's id and role
    ///
    /// Email and username must both match the same record. The last-login
    /// timestamp is written before the token is issued; if that write fails
    /// no token is returned.
    pub async fn login(&self, input: LoginAttempt) -> Result<IssuedToken, CoreError> {
        let (Some(email), Some(username), Some(password)) = (
            non_empty(input.email),
            non_empty(input.username),
            non_empty(input.password),
        ) else {
            return Err(CoreError::Validation(MISSING_FIELDS.to_string()));
        };

        debug!("Login attempt for user: {}", username);

        let user = self.store.find_user_by_login(&email, &username).await?;
        let hash_to_verify = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());

        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash_to_verify))
                .await
                .map_err(|e| CoreError::Internal(format!("Verification task failed: {}", e)))?;

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            _ => {
                metrics::counter!("rolegate_logins_total", "outcome" => "rejected").increment(1);
                warn!("Rejected login for user: {}", username);
                return Err(CoreError::InvalidCredentials);
            }
        };

        if !self.store.record_login(&user.id, Utc::now()).await? {
            return Err(CoreError::Internal(format!(
                "User {} disappeared during login",
                user.id
            )));
        }

        let token = self.jwt.generate_token(&user.id, &user.role)?;

        metrics::counter!("rolegate_logins_total", "outcome" => "success").increment(1);
        info!("User {} logged in successfully", user.username);

        Ok(IssuedToken {
            token,
            expires_in: self.jwt.token_ttl().num_seconds(),
        })
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.store.list_users().await?)
    }

    /// Update a user's email, username or role; empty values are ignored
    pub async fn update_user(&self, id: &str, update: UserUpdate) -> Result<(), CoreError> {
        let update = UserUpdate {
            email: non_empty(update.email),
            username: non_empty(update.username),
            role: non_empty(update.role),
        };
        if update.is_empty() {
            return Err(CoreError::Validation("No fields to update".to_string()));
        }

        if !self.store.update_user(id, update).await? {
            return Err(CoreError::NotFound(format!("User: {}", id)));
        }

        info!("Updated user: {}", id);
        Ok(())
    }

    /// Delete a user; deleting an absent user is not an error
    pub async fn delete_user(&self, id: &str) -> Result<(), CoreError> {
        if self.store.delete_user(id).await? {
            info!("Deleted user: {}", id);
        } else {
            debug!("Delete requested for absent user: {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use rolegate_db::{Database, DbError, Role};
    use std::collections::BTreeSet;

    /// How `LoginWriteStore` answers `record_login`
    #[derive(Clone, Copy)]
    enum LoginWrite {
        NoRow,
        Fails,
    }

    /// Real database whose last-login write misbehaves
    struct LoginWriteStore {
        inner: Database,
        outcome: LoginWrite,
    }

    #[async_trait]
    impl CredentialStore for LoginWriteStore {
        async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
            self.inner.insert_user(user).await
        }
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
            self.inner.find_user_by_email(email).await
        }
        async fn find_user_by_login(&self, e: &str, u: &str) -> Result<Option<User>, DbError> {
            self.inner.find_user_by_login(e, u).await
        }
        async fn get_user(&self, id: &str) -> Result<Option<User>, DbError> {
            self.inner.get_user(id).await
        }
        async fn list_users(&self) -> Result<Vec<User>, DbError> {
            self.inner.list_users().await
        }
        async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool, DbError> {
            self.inner.update_user(id, update).await
        }
        async fn record_login(&self, _: &str, _: DateTime<Utc>) -> Result<bool, DbError> {
            match self.outcome {
                LoginWrite::NoRow => Ok(false),
                LoginWrite::Fails => Err(DbError::Connection(sqlx::Error::PoolClosed)),
            }
        }
        async fn delete_user(&self, id: &str) -> Result<bool, DbError> {
            self.inner.delete_user(id).await
        }
        async fn has_users(&self) -> Result<bool, DbError> {
            self.inner.has_users().await
        }
        async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
            self.inner.list_roles().await
        }
        async fn get_role(&self, name: &str) -> Result<Option<Role>, DbError> {
            self.inner.get_role(name).await
        }
        async fn insert_role(&self, role: Role) -> Result<Role, DbError> {
            self.inner.insert_role(role).await
        }
        async fn replace_permissions(&self, n: &str, p: BTreeSet<String>) -> Result<bool, DbError> {
            self.inner.replace_permissions(n, &p).await
        }
        async fn add_permission(&self, name: &str, p: &str) -> Result<bool, DbError> {
            self.inner.add_permission(name, p).await
        }
        async fn remove_permission(&self, name: &str, p: &str) -> Result<bool, DbError> {
            self.inner.remove_permission(name, p).await
        }
        async fn delete_role(&self, name: &str) -> Result<bool, DbError> {
            self.inner.delete_role(name).await
        }
    }

    async fn service_with_login_write(outcome: LoginWrite) -> AccountService {
        let store = LoginWriteStore {
            inner: Database::in_memory().await.unwrap(),
            outcome,
        };
        let jwt = Arc::new(JwtManager::new("test-secret", Duration::seconds(60)));
        AccountService::new(Arc::new(store), jwt)
    }

    async fn service() -> (AccountService, Arc<Database>, Arc<JwtManager>) {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let jwt = Arc::new(JwtManager::new("test-secret", Duration::seconds(60)));
        (AccountService::new(db.clone(), jwt.clone()), db, jwt)
    }

    fn registration(email: &str, username: &str, role: Option<&str>) -> Registration {
        Registration {
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            password: Some("hunter22".to_string()),
            role: role.map(str::to_string),
        }
    }

    fn attempt(email: &str, username: &str, password: &str) -> LoginAttempt {
        LoginAttempt {
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_resolve_role() {
        assert_eq!(resolve_role(None), DEFAULT_ROLE);
        assert_eq!(resolve_role(Some("")), DEFAULT_ROLE);
        assert_eq!(resolve_role(Some("editor")), "editor");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (accounts, db, jwt) = service().await;

        let user = accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_ne!(user.password_hash, "hunter22");

        let issued = accounts
            .login(attempt("ana@example.com", "ana", "hunter22"))
            .await
            .unwrap();
        assert_eq!(issued.expires_in, 60);

        let claims = jwt.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, DEFAULT_ROLE);

        let stored = db.get_user(&user.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let (accounts, _, _) = service().await;

        let mut input = registration("ana@example.com", "ana", None);
        input.password = None;
        assert!(matches!(
            accounts.register(input).await,
            Err(CoreError::Validation(_))
        ));

        let mut input = registration("ana@example.com", "ana", None);
        input.email = Some(String::new());
        assert!(matches!(
            accounts.register(input).await,
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (accounts, _, _) = service().await;

        accounts
            .register(registration("ana@example.com", "ana", Some("editor")))
            .await
            .unwrap();
        let second = accounts
            .register(registration("ana@example.com", "other", None))
            .await;
        assert!(matches!(second, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_requires_matching_username() {
        let (accounts, db, _) = service().await;
        let user = accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();

        let result = accounts
            .login(attempt("ana@example.com", "not-ana", "hunter22"))
            .await;
        assert!(matches!(result, Err(CoreError::InvalidCredentials)));

        // A rejected login does not touch the record
        let stored = db.get_user(&user.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_alike() {
        let (accounts, _, _) = service().await;
        accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();

        let wrong_password = accounts
            .login(attempt("ana@example.com", "ana", "nope"))
            .await
            .unwrap_err();
        let unknown = accounts
            .login(attempt("bob@example.com", "bob", "hunter22"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let (accounts, _, _) = service().await;
        let result = accounts
            .login(LoginAttempt {
                email: Some("ana@example.com".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_token_role_is_snapshot_at_issuance() {
        let (accounts, _, jwt) = service().await;
        let user = accounts
            .register(registration("ana@example.com", "ana", Some("editor")))
            .await
            .unwrap();

        let issued = accounts
            .login(attempt("ana@example.com", "ana", "hunter22"))
            .await
            .unwrap();

        accounts
            .update_user(
                &user.id,
                UserUpdate {
                    role: Some("admin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(jwt.validate_token(&issued.token).unwrap().role, "editor");
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let (accounts, db, _) = service().await;
        let user = accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();

        let empty = accounts
            .update_user(
                &user.id,
                UserUpdate {
                    email: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(empty, Err(CoreError::Validation(_))));

        let missing = accounts
            .update_user(
                "missing",
                UserUpdate {
                    username: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(missing, Err(CoreError::NotFound(_))));

        accounts
            .update_user(
                &user.id,
                UserUpdate {
                    username: Some("ana2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(db.get_user(&user.id).await.unwrap().unwrap().username, "ana2");

        accounts.delete_user(&user.id).await.unwrap();
        accounts.delete_user(&user.id).await.unwrap();
        assert!(accounts.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_without_recorded_login_issues_no_token() {
        let accounts = service_with_login_write(LoginWrite::NoRow).await;
        accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();

        let result = accounts
            .login(attempt("ana@example.com", "ana", "hunter22"))
            .await;
        assert!(matches!(result, Err(CoreError::Internal(_))));
    }

    #[tokio::test]
    async fn test_login_write_failure_issues_no_token() {
        let accounts = service_with_login_write(LoginWrite::Fails).await;
        accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();

        let result = accounts
            .login(attempt("ana@example.com", "ana", "hunter22"))
            .await;
        assert!(matches!(result, Err(CoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_login_with_unrepresentable_ttl_fails_cleanly() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let jwt = Arc::new(JwtManager::new(
            "test-secret",
            Duration::seconds(1_000_000_000_000_000),
        ));
        let accounts = AccountService::new(db, jwt);
        accounts
            .register(registration("ana@example.com", "ana", None))
            .await
            .unwrap();

        let result = accounts
            .login(attempt("ana@example.com", "ana", "hunter22"))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::Auth(rolegate_auth::AuthError::ExpiryOutOfRange))
        ));
    }
}
