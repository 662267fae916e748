//! Authentication service for login and password management

use crate::error::HttpError;
use crate::services::JwtService;
use quorum_core::{ClaimSet, StateBackend, User};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Verified caller identity, inserted into request extensions by the auth
/// middleware and read by the authorization extractors.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub claims: ClaimSet,
}

/// Coordinates credential checks and token issuance
pub struct AuthService {
    jwt_service: Arc<JwtService>,
    state_backend: Arc<dyn StateBackend>,
}

impl AuthService {
    pub fn new(jwt_service: Arc<JwtService>, state_backend: Arc<dyn StateBackend>) -> Self {
        Self {
            jwt_service,
            state_backend,
        }
    }

    /// Hash a password, salted with the user id.
    pub fn hash_password(user_id: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        hex_encode(&hasher.finalize())
    }

    /// Hash a raw password-set token for storage and lookup.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex_encode(&hasher.finalize())
    }

    /// Issue a session token for a user record.
    pub fn issue_token(&self, user: &User) -> Result<String, HttpError> {
        self.jwt_service
            .generate_token(&user.id, &user.email, user.owner, user.executive)
    }

    /// Verify credentials and issue a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), HttpError> {
        let user = self
            .state_backend
            .get_user_by_email(email)
            .await
            .map_err(|e| HttpError::InternalServerError(e.to_string()))?
            .ok_or_else(|| HttpError::AuthenticationFailed("Invalid credentials".to_string()))?;

        if !user.is_enabled() {
            return Err(HttpError::AuthenticationFailed(
                "Account is disabled".to_string(),
            ));
        }

        let expected = user.password_hash.as_deref().ok_or_else(|| {
            HttpError::AuthenticationFailed("Password has not been set".to_string())
        })?;
        if Self::hash_password(&user.id, password) != expected {
            return Err(HttpError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ));
        }

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Consume an invitation token and set the account password.
    pub async fn set_password(&self, raw_token: &str, password: &str) -> Result<(), HttpError> {
        if password.len() < 8 {
            return Err(HttpError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let token_hash = Self::hash_token(raw_token);
        let token = self
            .state_backend
            .get_password_token(&token_hash)
            .await
            .map_err(|e| HttpError::InternalServerError(e.to_string()))?
            .ok_or_else(|| HttpError::BadRequest("Invalid or used token".to_string()))?;

        if token.is_expired(chrono::Utc::now()) {
            // Remove so a retry reports the same failure
            self.state_backend
                .delete_password_token(&token_hash)
                .await
                .map_err(|e| HttpError::InternalServerError(e.to_string()))?;
            return Err(HttpError::BadRequest("Token has expired".to_string()));
        }

        let password_hash = Self::hash_password(&token.user_id, password);
        self.state_backend
            .set_password_hash(&token.user_id, &password_hash)
            .await
            .map_err(|e| HttpError::InternalServerError(e.to_string()))?;
        self.state_backend
            .delete_password_token(&token_hash)
            .await
            .map_err(|e| HttpError::InternalServerError(e.to_string()))?;

        Ok(())
    }

    /// Validate a session token and return the caller identity.
    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, HttpError> {
        let claims = self.jwt_service.validate_token(token)?;

        Ok(AuthenticatedUser {
            id: claims.sub,
            email: claims.email,
            claims: ClaimSet {
                owner: claims.owner,
                executive: claims.executive,
            },
        })
    }

    /// Extract and validate a token from an Authorization header.
    pub fn authenticate_from_header(
        &self,
        auth_header: &str,
    ) -> Result<AuthenticatedUser, HttpError> {
        let token = self.jwt_service.extract_bearer_token(auth_header)?;
        self.validate_token(token)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_salted_by_user_id() {
        let a = AuthService::hash_password("u1", "secret");
        let b = AuthService::hash_password("u2", "secret");
        assert_ne!(a, b);
        assert_eq!(a, AuthService::hash_password("u1", "secret"));
    }

    #[test]
    fn token_hash_is_stable() {
        assert_eq!(
            AuthService::hash_token("abc"),
            AuthService::hash_token("abc")
        );
        assert_ne!(
            AuthService::hash_token("abc"),
            AuthService::hash_token("abd")
        );
    }
}
