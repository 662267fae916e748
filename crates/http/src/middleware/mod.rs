//! Middleware components for HTTP request processing

pub mod auth;
pub mod authz;

pub use auth::{auth_middleware, should_skip_auth};
pub use authz::{CurrentUser, OwnerOnly, Privileged};
