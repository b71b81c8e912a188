//! rolegate HTTP API
//!
//! This crate provides the Axum router for registration, login, user
//! administration and the role registry, plus health and metrics endpoints.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
