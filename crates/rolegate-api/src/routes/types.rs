//! Request/Response DTOs
//!
//! Request fields are optional so a missing field reaches the core
//! validation instead of failing deserialization.

use rolegate_core::{LoginAttempt, Registration};
use rolegate_db::{Role, User, UserUpdate};
use serde::{Deserialize, Serialize};

/// Plain acknowledgement
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Registration {
            email: request.email,
            username: request.username,
            password: request.password,
            role: request.role,
        }
    }
}

/// Login request
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<LoginRequest> for LoginAttempt {
    fn from(request: LoginRequest) -> Self {
        LoginAttempt {
            email: request.email,
            username: request.username,
            password: request.password,
        }
    }
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub expires_in: i64,
}

// ==================== User Types ====================

/// Update user request
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(request: UpdateUserRequest) -> Self {
        UserUpdate {
            email: request.email,
            username: request.username,
            role: request.role,
        }
    }
}

/// User response (without password)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub date_register: String,
    pub last_login: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
            date_register: user.registered_at.to_rfc3339(),
            last_login: user.last_login_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// User listing
#[derive(Serialize)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<UserResponse>,
}

// ==================== Role Types ====================

/// Create role request
#[derive(Deserialize, Default)]
pub struct CreateRoleRequest {
    pub role_name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Replace permissions request
#[derive(Deserialize, Default)]
pub struct UpdateRoleRequest {
    pub permissions: Option<Vec<String>>,
}

/// Single permission request
#[derive(Deserialize, Default)]
pub struct PermissionRequest {
    pub permission: Option<String>,
}

/// Role response
#[derive(Serialize)]
pub struct RoleResponse {
    /// Store key; equal to the role name
    pub id: String,
    pub role_name: String,
    pub permissions: Vec<String>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        RoleResponse {
            id: role.name.clone(),
            role_name: role.name,
            permissions: role.permissions.into_iter().collect(),
        }
    }
}

/// Role listing
#[derive(Serialize)]
pub struct RolesResponse {
    pub message: String,
    pub roles: Vec<RoleResponse>,
}
