//! Services for authentication and invitations

mod auth;
mod invite;
mod jwt;

pub use auth::{AuthService, AuthenticatedUser};
pub use invite::{InviteConfig, InviteService};
pub use jwt::{Claims, JwtConfig, JwtService};
