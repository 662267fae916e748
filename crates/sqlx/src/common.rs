//! Row types and timestamp helpers

use chrono::{DateTime, Utc};
use quorum_core::{BlogPost, Error, MailMessage, PasswordToken, Result, User, UserProfile};
use sqlx::FromRow;

// Timestamps are stored as RFC3339 text for portability
pub fn datetime_to_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn string_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::state(format!("Invalid timestamp format: {e}")))
}

#[derive(FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub owner: i32,
    pub executive: i32,
    pub disabled: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(FromRow)]
pub struct PermissionRow {
    pub user_id: String,
    pub committee_id: String,
    pub allowed: i32,
}

#[derive(FromRow)]
pub struct PostRow {
    pub id: String,
    pub author_id: String,
    pub organization: String,
    pub body: String,
    pub visible: i32,
    pub timestamp: String,
}

#[derive(FromRow)]
pub struct TokenRow {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: String,
}

#[derive(FromRow)]
pub struct MailRow {
    pub id: String,
    pub recipient: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            owner: row.owner != 0,
            executive: row.executive != 0,
            disabled: row.disabled != 0,
            created_at: string_to_datetime(&row.created_at).unwrap_or_else(|_| Utc::now()),
            updated_at: string_to_datetime(&row.updated_at).unwrap_or_else(|_| Utc::now()),
        }
    }
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            email: row.email,
            display_name: row.display_name,
            photo_url: row.photo_url,
            created_at: string_to_datetime(&row.created_at).unwrap_or_else(|_| Utc::now()),
            updated_at: string_to_datetime(&row.updated_at).unwrap_or_else(|_| Utc::now()),
        }
    }
}

impl From<PostRow> for BlogPost {
    fn from(row: PostRow) -> Self {
        BlogPost {
            id: row.id,
            author_id: row.author_id,
            organization: row.organization,
            body: row.body,
            visible: row.visible != 0,
            timestamp: string_to_datetime(&row.timestamp).unwrap_or_else(|_| Utc::now()),
        }
    }
}

impl From<TokenRow> for PasswordToken {
    fn from(row: TokenRow) -> Self {
        PasswordToken {
            token_hash: row.token_hash,
            user_id: row.user_id,
            expires_at: string_to_datetime(&row.expires_at).unwrap_or_else(|_| Utc::now()),
        }
    }
}

impl From<MailRow> for MailMessage {
    fn from(row: MailRow) -> Self {
        MailMessage {
            id: row.id,
            to: row.recipient,
            subject: row.subject,
            text_body: row.text_body,
            html_body: row.html_body,
            created_at: string_to_datetime(&row.created_at).unwrap_or_else(|_| Utc::now()),
        }
    }
}
