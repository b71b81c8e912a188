//! rolegate authentication and authorization
//!
//! This crate provides password hashing, JWT issuance and verification,
//! and the two-stage request gate (authenticate, then check a named
//! permission against the role registry).

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{
    AuthUser, PermissionGate, auth_middleware, authenticate, extract_bearer_token,
    permission_middleware, require_permission, role_grants,
};
pub use password::{hash_password, verify_password};
