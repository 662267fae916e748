use crate::types::PermissionRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signed role attributes carried in a session token.
///
/// `owner` is a superset of `executive`: owners hold every executive right
/// plus claim mutation. Neither role is governed by a permission record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub owner: bool,
    pub executive: bool,
}

impl ClaimSet {
    pub fn member() -> Self {
        Self::default()
    }

    pub fn executive() -> Self {
        Self {
            owner: false,
            executive: true,
        }
    }

    pub fn owner() -> Self {
        Self {
            owner: true,
            executive: false,
        }
    }

    /// Owner or executive standing.
    pub fn is_privileged(&self) -> bool {
        self.owner || self.executive
    }
}

/// Reasons for access denial
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Only owners may perform this action")]
    OwnerRequired,

    #[error("Only owners and executives may perform this action")]
    PrivilegeRequired,

    #[error("No posting permission for committee '{0}'")]
    CommitteeDenied(String),

    #[error("Permissions of owners and executives are not editable")]
    PrivilegedTarget,
}

pub type AccessResult = std::result::Result<(), AccessDenied>;

/// Admit only owners. Guards claim mutation.
pub fn require_owner(claims: &ClaimSet) -> AccessResult {
    if claims.owner {
        Ok(())
    } else {
        Err(AccessDenied::OwnerRequired)
    }
}

/// Admit owners and executives. Guards moderation, permission toggling,
/// user invitation and listings of hidden content.
pub fn require_privileged(claims: &ClaimSet) -> AccessResult {
    if claims.is_privileged() {
        Ok(())
    } else {
        Err(AccessDenied::PrivilegeRequired)
    }
}

/// Posting gate: privileged callers may post to any committee, everyone else
/// needs their committee flag set in the permission record.
pub fn check_posting(
    claims: &ClaimSet,
    committee_id: &str,
    record: Option<&PermissionRecord>,
) -> AccessResult {
    if claims.is_privileged() {
        return Ok(());
    }

    match record {
        Some(record) if record.allows(committee_id) => Ok(()),
        _ => Err(AccessDenied::CommitteeDenied(committee_id.to_string())),
    }
}

/// Precondition for permission toggling: the target must not itself hold
/// executive or owner standing.
pub fn check_toggle_target(target: &ClaimSet) -> AccessResult {
    if target.is_privileged() {
        Err(AccessDenied::PrivilegedTarget)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(committee: &str, value: bool) -> PermissionRecord {
        let mut record = PermissionRecord::all_false("u1", &[committee.to_string()]);
        record.set(committee, value);
        record
    }

    #[test]
    fn owner_implies_privileged() {
        let claims = ClaimSet::owner();
        assert!(require_owner(&claims).is_ok());
        assert!(require_privileged(&claims).is_ok());
    }

    #[test]
    fn executive_is_privileged_but_not_owner() {
        let claims = ClaimSet::executive();
        assert_eq!(require_owner(&claims), Err(AccessDenied::OwnerRequired));
        assert!(require_privileged(&claims).is_ok());
    }

    #[test]
    fn member_is_denied_everywhere() {
        let claims = ClaimSet::member();
        assert_eq!(require_owner(&claims), Err(AccessDenied::OwnerRequired));
        assert_eq!(
            require_privileged(&claims),
            Err(AccessDenied::PrivilegeRequired)
        );
    }

    #[test]
    fn privileged_claims_post_to_any_committee() {
        // No record consulted for owners or executives
        assert!(check_posting(&ClaimSet::owner(), "awards", None).is_ok());
        assert!(check_posting(&ClaimSet::executive(), "policy", None).is_ok());
        let denied = record_with("awards", false);
        assert!(check_posting(&ClaimSet::owner(), "awards", Some(&denied)).is_ok());
    }

    #[test]
    fn member_posting_follows_the_record() {
        let claims = ClaimSet::member();
        let allowed = record_with("awards", true);
        assert!(check_posting(&claims, "awards", Some(&allowed)).is_ok());

        let denied = record_with("awards", false);
        assert_eq!(
            check_posting(&claims, "awards", Some(&denied)),
            Err(AccessDenied::CommitteeDenied("awards".to_string()))
        );

        // Missing record means deny
        assert_eq!(
            check_posting(&claims, "awards", None),
            Err(AccessDenied::CommitteeDenied("awards".to_string()))
        );

        // A flag on one committee grants nothing elsewhere
        assert_eq!(
            check_posting(&claims, "policy", Some(&allowed)),
            Err(AccessDenied::CommitteeDenied("policy".to_string()))
        );
    }

    #[test]
    fn toggle_target_rejects_privileged_users() {
        assert_eq!(
            check_toggle_target(&ClaimSet::executive()),
            Err(AccessDenied::PrivilegedTarget)
        );
        assert_eq!(
            check_toggle_target(&ClaimSet::owner()),
            Err(AccessDenied::PrivilegedTarget)
        );
        assert!(check_toggle_target(&ClaimSet::member()).is_ok());
    }
}
