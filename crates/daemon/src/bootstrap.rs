//! Owner account seeding
//!
//! Runs once at startup, before the server accepts requests. Claims are
//! otherwise only mutable through the owner-only API, so the first owner
//! has to come from configuration.

use crate::Result;
use chrono::Utc;
use quorum_core::{StateBackend, User};
use quorum_http::services::AuthService;
use tracing::{info, warn};

/// Make sure the configured owner account exists. Returns `true` when the
/// account was created.
pub async fn ensure_owner(
    backend: &dyn StateBackend,
    email: &str,
    password: Option<&str>,
) -> Result<bool> {
    if let Some(user) = backend.get_user_by_email(email).await? {
        if !user.owner {
            // The owner flag is fixed at account creation; flag the
            // mismatch instead of silently serving without an owner.
            warn!(email, "configured owner account exists without the owner claim");
        }
        if !user.executive {
            backend.set_executive(&user.id, true).await?;
            info!(email, "granted executive claim to the configured owner");
        }
        return Ok(false);
    }

    let Some(password) = password else {
        warn!(
            email,
            "owner account does not exist and no bootstrap password is configured, skipping"
        );
        return Ok(false);
    };

    let now = Utc::now();
    let user_id = uuid::Uuid::new_v4().to_string();
    let user = User {
        id: user_id.clone(),
        email: email.to_string(),
        password_hash: Some(AuthService::hash_password(&user_id, password)),
        owner: true,
        executive: true,
        disabled: false,
        created_at: now,
        updated_at: now,
    };
    backend.create_user(&user).await?;
    info!(email, "created owner account");

    Ok(true)
}
