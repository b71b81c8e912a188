//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use rolegate_auth::{JwtManager, PermissionGate, require_permission};
use rolegate_core::{AccountService, RoleRegistry};
use rolegate_db::CredentialStore;
use std::sync::Arc;

/// Handle used to render the Prometheus scrape output
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub jwt: Arc<JwtManager>,
    pub accounts: Arc<AccountService>,
    pub roles: Arc<RoleRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, jwt: Arc<JwtManager>) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store.clone(), jwt.clone())),
            roles: Arc::new(RoleRegistry::new(store.clone())),
            store,
            jwt,
        }
    }

    /// Gate requiring `permission` from the caller's role
    pub fn permission_gate(&self, permission: &'static str) -> PermissionGate {
        require_permission(self.store.clone(), permission)
    }
}
