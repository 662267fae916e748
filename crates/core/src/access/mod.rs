//! Claim-based access decisions
//!
//! Every privileged operation goes through the functions in this module;
//! handlers never re-derive admit/deny rules on their own.

mod claims;

pub use claims::{
    check_posting, check_toggle_target, require_owner, require_privileged, AccessDenied,
    AccessResult, ClaimSet,
};
