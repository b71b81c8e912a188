//! Role registry endpoints

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use super::types::{
    CreateRoleRequest, MessageResponse, PermissionRequest, RoleResponse, RolesResponse,
    UpdateRoleRequest,
};
use super::{authenticated, guarded};
use crate::error::ApiError;
use crate::state::AppState;
use rolegate_core::permissions;

/// GET /getRoles
async fn list_roles(State(state): State<AppState>) -> Result<Json<RolesResponse>, ApiError> {
    let roles = state.roles.list_roles().await?;

    Ok(Json(RolesResponse {
        message: "Roles retrieved successfully".to_string(),
        roles: roles.into_iter().map(RoleResponse::from).collect(),
    }))
}

/// POST /addRol
async fn create_role(
    State(state): State<AppState>,
    payload: Result<Json<CreateRoleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload?;
    state
        .roles
        .create_role(request.role_name, request.permissions)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Role created successfully")),
    ))
}

/// PUT /updateRol/{roleName}
async fn update_role(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    state
        .roles
        .replace_permissions(&role_name, request.permissions)
        .await?;
    Ok(Json(MessageResponse::new("Role updated successfully")))
}

/// DELETE /deleteRol/{roleName}
async fn delete_role(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.roles.delete_role(&role_name).await?;
    Ok(Json(MessageResponse::new("Role deleted successfully")))
}

/// POST /addPermission/{roleName}
async fn add_permission(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
    payload: Result<Json<PermissionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    state
        .roles
        .add_permission(&role_name, request.permission)
        .await?;
    Ok(Json(MessageResponse::new("Permission added successfully")))
}

/// POST /deletePermission/{roleName}
async fn remove_permission(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
    payload: Result<Json<PermissionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    state
        .roles
        .remove_permission(&role_name, request.permission)
        .await?;
    Ok(Json(MessageResponse::new("Permission removed successfully")))
}

/// Create role routes
///
/// Listing needs only a valid token; every mutation needs its permission.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/getRoles", authenticated(state, get(list_roles)))
        .route(
            "/addRol",
            guarded(state, permissions::ADD_ROLE, post(create_role)),
        )
        .route(
            "/updateRol/{roleName}",
            guarded(state, permissions::UPDATE_ROLE, put(update_role)),
        )
        .route(
            "/deleteRol/{roleName}",
            guarded(state, permissions::DELETE_ROLE, delete(delete_role)),
        )
        .route(
            "/addPermission/{roleName}",
            guarded(state, permissions::ADD_PERMISSION, post(add_permission)),
        )
        .route(
            "/deletePermission/{roleName}",
            guarded(state, permissions::DELETE_PERMISSION, post(remove_permission)),
        )
}
