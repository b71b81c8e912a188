//! rolegate core business logic
//!
//! Registration and login, user administration, and the role registry.
//! Every operation returns a `CoreError` that the API layer maps to a
//! transport status in one place.

pub mod accounts;
pub mod bootstrap;
pub mod error;
pub mod permissions;
pub mod roles;

pub use accounts::{AccountService, DEFAULT_ROLE, IssuedToken, LoginAttempt, Registration};
pub use bootstrap::{BootstrapConfig, seed};
pub use error::CoreError;
pub use roles::RoleRegistry;
