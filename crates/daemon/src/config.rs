//! Configuration management for the Quorum daemon

use crate::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session token configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// User invitation configuration
    #[serde(default)]
    pub invite: InviteSettings,

    /// Post listing configuration
    #[serde(default)]
    pub posts: PostsConfig,

    /// Startup owner seeding
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server
    pub bind_addr: SocketAddr,

    /// Enable CORS for the web frontend
    pub cors_enabled: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL or path
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for signing session tokens
    pub jwt_secret: String,

    /// Token lifetime in hours
    pub token_expiry_hours: i64,

    /// Token issuer
    pub issuer: String,
}

/// User invitation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteSettings {
    /// Frontend base URL used in password-set links
    pub frontend_url: String,

    /// Committees seeded into new permission records
    pub committees: Vec<String>,

    /// Password-set token lifetime in hours
    pub token_ttl_hours: i64,

    /// Welcome email subject line
    pub mail_subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsConfig {
    /// Page size for post listings
    pub per_page: u32,
}

/// Startup owner seeding. When an email is set, the daemon makes sure that
/// account exists and holds the owner claim before serving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub owner_email: Option<String>,

    /// Initial password, only consumed when the account is created
    pub owner_password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            invite: InviteSettings::default(),
            posts: PostsConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            cors_enabled: true,
            timeout_secs: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://quorum.db".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "insecure-dev-secret".to_string(),
            token_expiry_hours: 24,
            issuer: "quorum".to_string(),
        }
    }
}

impl Default for InviteSettings {
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

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            per_page: quorum_core::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Load configuration from a file, with `QUORUM_*` environment
    /// variables taking precedence
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("QUORUM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr.to_string())?
            .set_default("server.cors_enabled", defaults.server.cors_enabled)?
            .set_default("server.timeout_secs", defaults.server.timeout_secs)?
            .set_default("database.url", defaults.database.url)?
            .set_default("auth.jwt_secret", defaults.auth.jwt_secret)?
            .set_default("auth.token_expiry_hours", defaults.auth.token_expiry_hours)?
            .set_default("auth.issuer", defaults.auth.issuer)?
            .set_default("invite.frontend_url", defaults.invite.frontend_url)?
            .set_default("invite.committees", defaults.invite.committees)?
            .set_default("invite.token_ttl_hours", defaults.invite.token_ttl_hours)?
            .set_default("invite.mail_subject", defaults.invite.mail_subject)?
            .set_default("posts.per_page", defaults.posts.per_page)?
            .add_source(config::Environment::with_prefix("QUORUM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr.port(), 8080);
        assert_eq!(settings.posts.per_page, 6);
        assert_eq!(settings.invite.committees.len(), 3);
        assert!(settings.bootstrap.owner_email.is_none());
    }

    #[test]
    fn env_defaults_deserialize() {
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.auth.issuer, "quorum");
        assert_eq!(settings.invite.token_ttl_hours, 72);
    }
}
