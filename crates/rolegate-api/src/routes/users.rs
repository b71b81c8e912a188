//! User administration

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{delete, get, put},
};

use super::guarded;
use super::types::{MessageResponse, UpdateUserRequest, UserResponse, UsersResponse};
use crate::error::ApiError;
use crate::state::AppState;
use rolegate_core::permissions;

/// GET /getUsers
async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.accounts.list_users().await?;

    Ok(Json(UsersResponse {
        message: "Users retrieved successfully".to_string(),
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /updateUsers/{id}
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    state.accounts.update_user(&id, request.into()).await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// DELETE /deleteUsers/{id}
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.delete_user(&id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Create user routes, each behind its permission
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/getUsers",
            guarded(state, permissions::GET_USER, get(list_users)),
        )
        .route(
            "/updateUsers/{id}",
            guarded(state, permissions::UPDATE_USER, put(update_user)),
        )
        .route(
            "/deleteUsers/{id}",
            guarded(state, permissions::DELETE_USER, delete(delete_user)),
        )
}
