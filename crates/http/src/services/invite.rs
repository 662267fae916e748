//! Invitation assembly
//!
//! Builds the full write bundle for a new user: account with a temporary
//! random password, initial profile, all-false committee permissions, a
//! single-use password-set token, and optionally the welcome email carrying
//! the password-set link.

use crate::services::AuthService;
use chrono::{Duration, Utc};
use quorum_core::{Invitation, MailMessage, PasswordToken, PermissionRecord, User, UserProfile};
use rand::{distributions::Alphanumeric, Rng};

const TOKEN_LENGTH: usize = 32;
const TEMP_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct InviteConfig {
    /// Frontend base URL used to build password-set links.
    pub frontend_url: String,
    /// Committee set seeded into new permission records.
    pub committees: Vec<String>,
    /// Password-set token lifetime.
    pub token_ttl_hours: i64,
    /// Welcome email subject line.
    pub mail_subject: String,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            committees: vec![
                "awards".to_string(),
                "chapterMeeting".to_string(),
                "policy".to_string(),
            ],
            token_ttl_hours: 72,
            mail_subject: "Welcome".to_string(),
        }
    }
}

pub struct InviteService {
    config: InviteConfig,
}

impl InviteService {
    pub fn new(config: InviteConfig) -> Self {
        Self { config }
    }

    pub fn committees(&self) -> &[String] {
        &self.config.committees
    }

    /// Build the invitation bundle. Returns the bundle and the raw token
    /// (only the hash is persisted).
    pub fn build_invitation(&self, email: &str, send_mail: bool) -> (Invitation, String) {
        let now = Utc::now();
        let user_id = uuid::Uuid::new_v4().to_string();

        // Temporary random password; the account is unusable until the
        // password-set link is followed.
        let temp_password = random_string(TEMP_PASSWORD_LENGTH);
        let user = User {
            id: user_id.clone(),
            email: email.to_string(),
            password_hash: Some(AuthService::hash_password(&user_id, &temp_password)),
            owner: false,
            executive: false,
            disabled: false,
            created_at: now,
            updated_at: now,
        };

        let raw_token = random_string(TOKEN_LENGTH);
        let token = PasswordToken {
            token_hash: AuthService::hash_token(&raw_token),
            user_id: user_id.clone(),
            expires_at: now + Duration::hours(self.config.token_ttl_hours),
        };

        let mail = send_mail.then(|| self.welcome_mail(email, &raw_token, now));

        let invitation = Invitation {
            user,
            profile: UserProfile::initial(&user_id, email, now),
            permissions: PermissionRecord::all_false(&user_id, &self.config.committees),
            token,
            mail,
        };

        (invitation, raw_token)
    }

    fn welcome_mail(
        &self,
        email: &str,
        raw_token: &str,
        now: chrono::DateTime<Utc>,
    ) -> MailMessage {
        let link = self.password_set_link(raw_token);
        MailMessage {
            id: uuid::Uuid::new_v4().to_string(),
            to: email.to_string(),
            subject: self.config.mail_subject.clone(),
            text_body: format!(
                "Welcome! Please use the following link to set your password: {link}"
            ),
            html_body: format!(
                "<h1>Welcome!</h1>\
                 <p>Please click the following link to set your password:</p>\
                 <p><a href=\"{link}\">Set Password</a></p>"
            ),
            created_at: now,
        }
    }

    pub fn password_set_link(&self, raw_token: &str) -> String {
        format!(
            "{}/admin/set-password?token={raw_token}",
            self.config.frontend_url.trim_end_matches('/')
        )
    }
}

fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invitation_seeds_all_false_permissions() {
        let service = InviteService::new(InviteConfig::default());
        let (invitation, _token) = service.build_invitation("jane@example.org", true);

        assert_eq!(invitation.permissions.permissions.len(), 3);
        assert!(invitation.permissions.permissions.values().all(|v| !v));
        assert!(!invitation.user.owner);
        assert!(!invitation.user.executive);
        assert_eq!(invitation.profile.display_name, "jane");
    }

    #[test]
    fn mail_carries_the_password_set_link() {
        let service = InviteService::new(InviteConfig {
            frontend_url: "https://chapter.example.org/".to_string(),
            ..Default::default()
        });
        let (invitation, raw_token) = service.build_invitation("jane@example.org", true);

        let mail = invitation.mail.expect("welcome mail");
        assert_eq!(mail.to, "jane@example.org");
        let link = format!("https://chapter.example.org/admin/set-password?token={raw_token}");
        assert!(mail.text_body.contains(&link));
        assert!(mail.html_body.contains(&link));

        // Only the hash is stored
        assert_eq!(
            invitation.token.token_hash,
            AuthService::hash_token(&raw_token)
        );
        assert_ne!(invitation.token.token_hash, raw_token);
    }

    #[test]
    fn plain_creation_skips_the_mail() {
        let service = InviteService::new(InviteConfig::default());
        let (invitation, _token) = service.build_invitation("jane@example.org", false);
        assert!(invitation.mail.is_none());
    }
}
