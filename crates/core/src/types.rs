use crate::access::ClaimSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account record holding credentials and role claims.
///
/// The `owner` and `executive` flags are the claim source of truth; they are
/// baked into the session token at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub owner: bool,
    pub executive: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn claims(&self) -> ClaimSet {
        ClaimSet {
            owner: self.owner,
            executive: self.executive,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Display profile, kept separate from the credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Initial profile for a freshly invited user. The display name defaults
    /// to the local part of the email address.
    pub fn initial(user_id: impl Into<String>, email: &str, now: DateTime<Utc>) -> Self {
        let display_name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            user_id: user_id.into(),
            email: email.to_string(),
            display_name,
            photo_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-user committee posting permissions.
///
/// Privileged users (owner or executive) are never governed by this record;
/// callers must check claims first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub user_id: String,
    pub permissions: BTreeMap<String, bool>,
}

impl PermissionRecord {
    /// All-false record over the given committee set, created at invite time.
    pub fn all_false(user_id: impl Into<String>, committees: &[String]) -> Self {
        Self {
            user_id: user_id.into(),
            permissions: committees.iter().map(|c| (c.clone(), false)).collect(),
        }
    }

    pub fn allows(&self, committee_id: &str) -> bool {
        self.permissions.get(committee_id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, committee_id: impl Into<String>, value: bool) {
        self.permissions.insert(committee_id.into(), value);
    }
}

/// Committee blog post. The body is an opaque rich-text HTML string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub author_id: String,
    pub organization: String,
    pub body: String,
    pub visible: bool,
    pub timestamp: DateTime<Utc>,
}

/// Filter for post listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Restrict to a single committee; `None` lists across all committees.
    pub organization: Option<String>,
    /// Include posts with `visible == false`. Privileged callers only.
    pub include_hidden: bool,
}

/// Single-use token backing a password-set link. Only the hash is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordToken {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Outbox row consumed by an external mail sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub created_at: DateTime<Utc>,
}

/// Everything written when a user is invited. Backends persist the bundle
/// atomically so a failure partway leaves no partial state.
#[derive(Debug, Clone)]
pub struct Invitation {
    pub user: User,
    pub profile: UserProfile,
    pub permissions: PermissionRecord,
    pub token: PasswordToken,
    /// `None` for plain account creation without a welcome email.
    pub mail: Option<MailMessage>,
}
