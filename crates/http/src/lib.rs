//! Quorum HTTP module providing routes, services and middleware
//!
//! Authentication is a bearer-token middleware; authorization happens in one
//! place, the extractors in `middleware::authz`, keyed on the verified claim
//! set carried by the token.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{HttpError, Result};
pub use routes::app;
pub use state::AppState;
