//! Authentication and authorization middleware for Axum
//!
//! Protected routes are wrapped in two layers. `auth_middleware` verifies the
//! bearer token and attaches an [`AuthUser`] to the request; a
//! [`PermissionGate`] built by [`require_permission`] then checks the named
//! permission against the role stored under the user's role name.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use rolegate_db::CredentialStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    /// Role captured in the token; `None` when the token carried none
    pub role: Option<String>,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            role: Some(claims.role.clone()).filter(|r| !r.is_empty()),
        }
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Verify the bearer token carried by a request's headers
pub fn authenticate(jwt: &JwtManager, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let claims = jwt.validate_token(token)?;
    Ok(AuthUser::from_claims(&claims))
}

/// Authentication middleware
///
/// Rejects the request unless it carries a valid bearer token, then adds
/// the AuthUser to request extensions.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(&jwt_manager, request.headers()).inspect_err(|e| {
        debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
    })?;

    debug!("Authenticated subject: {} ({:?})", user.id, user.role);

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Guard state for one protected operation
#[derive(Clone)]
pub struct PermissionGate {
    store: Arc<dyn CredentialStore>,
    permission: Arc<str>,
}

impl PermissionGate {
    /// Permission this gate requires
    pub fn permission(&self) -> &str {
        &self.permission
    }
}

/// Build a gate that requires `permission`
///
/// Use with `axum::middleware::from_fn_with_state(gate, permission_middleware)`
/// layered inside `auth_middleware`.
pub fn require_permission(
    store: Arc<dyn CredentialStore>,
    permission: impl Into<Arc<str>>,
) -> PermissionGate {
    PermissionGate {
        store,
        permission: permission.into(),
    }
}

/// Middleware to require the gate's permission
pub async fn permission_middleware(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuthHeader)?;

    if !role_grants(gate.store.as_ref(), user.role.as_deref(), gate.permission()).await {
        warn!(
            "Denied '{}' to subject {} (role {:?})",
            gate.permission(),
            user.id,
            user.role
        );
        metrics::counter!(
            "rolegate_authz_denied_total",
            "permission" => gate.permission().to_string()
        )
        .increment(1);
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Resolve whether `role` currently grants `permission`
///
/// A missing role name, an unknown role, or a store failure all deny.
pub async fn role_grants(
    store: &dyn CredentialStore,
    role: Option<&str>,
    permission: &str,
) -> bool {
    let Some(role) = role.filter(|r| !r.is_empty()) else {
        return false;
    };

    match store.get_role(role).await {
        Ok(Some(record)) => record.grants(permission),
        Ok(None) => {
            debug!("Role '{}' does not exist; granting nothing", role);
            false
        }
        Err(e) => {
            error!("Permission lookup for role '{}' failed: {}", role, e);
            false
        }
    }
}
