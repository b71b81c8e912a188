//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("No token provided")]
    MissingAuthHeader,

    #[error("Malformed token")]
    InvalidAuthHeader,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token expiry is out of range")]
    ExpiryOutOfRange,

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// HTTP status for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_) | AuthError::ExpiryOutOfRange => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show to the caller
    ///
    /// Invalid and expired tokens share one message so the response does
    /// not tell which check failed.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::MissingAuthHeader => "No token provided",
            AuthError::InvalidAuthHeader => "Malformed token",
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Jwt(_) => {
                "Invalid or expired token"
            }
            AuthError::InsufficientPermissions => "You do not have permission for this action",
            AuthError::PasswordHash(_) | AuthError::ExpiryOutOfRange => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!("Authentication failed internally: {}", self);
        }

        let body = axum::Json(json!({
            "message": self.public_message()
        }));

        (self.status(), body).into_response()
    }
}
