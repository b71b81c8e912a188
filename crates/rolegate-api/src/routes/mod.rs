//! API routes

mod auth;
mod health;
pub mod metrics;
mod roles;
pub mod types;
mod users;

use axum::{Router, middleware::from_fn_with_state, routing::MethodRouter};
use rolegate_auth::{auth_middleware, permission_middleware};
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Require a valid bearer token
fn authenticated(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.jwt.clone(), auth_middleware))
}

/// Require a valid bearer token whose role grants `permission`
///
/// Layers run outermost-last, so the token check runs before the
/// permission lookup.
fn guarded(
    state: &AppState,
    permission: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let route = route.route_layer(from_fn_with_state(
        state.permission_gate(permission),
        permission_middleware,
    ));
    authenticated(state, route)
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Registration and login
        .merge(auth::routes())
        // Protected administration
        .merge(users::routes(&state))
        .merge(roles::routes(&state))
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
