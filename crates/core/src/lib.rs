//! Quorum core types and access model
//!
//! Domain records, the claim/permission decision rules, offset pagination,
//! and the `StateBackend` storage trait shared by every deployment.

pub mod access;
pub mod error;
pub mod page;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use access::{AccessDenied, AccessResult, ClaimSet};
pub use error::{Error, Result};
pub use page::{PageRequest, Paginated, DEFAULT_PAGE_SIZE};
pub use state::StateBackend;
pub use types::{
    BlogPost, Invitation, MailMessage, PasswordToken, PermissionRecord, PostFilter, User,
    UserProfile,
};
