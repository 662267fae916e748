//! JWT service for token management

use crate::error::HttpError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT Claims structure. The role flags are the signed claim set every
/// authorization decision is keyed on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Account email
    pub email: String,
    /// Owner claim
    pub owner: bool,
    /// Executive claim
    pub executive: bool,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// JWT service configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration duration
    pub expiration: Duration,
    /// Token issuer
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_hours: i64, issuer: String) -> Self {
        Self {
            secret,
            expiration: Duration::hours(expiration_hours),
            issuer,
        }
    }
}

/// JWT service for token operations
pub struct JwtService {
    config: Arc<JwtConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token carrying the user's claim set
    pub fn generate_token(
        &self,
        user_id: &str,
        email: &str,
        owner: bool,
        executive: bool,
    ) -> Result<String, HttpError> {
        let now = Utc::now();
        let expiration = now + self.config.expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            owner,
            executive,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| HttpError::InternalServerError(format!("Failed to generate token: {e}")))
    }

    /// Validate a token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, HttpError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&self.config.issuer));

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    HttpError::AuthenticationFailed("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    HttpError::AuthenticationFailed("Invalid token".to_string())
                }
                _ => HttpError::AuthenticationFailed(format!("Token validation failed: {e}")),
            })
    }

    /// Extract token from Authorization header
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, HttpError> {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            Ok(token)
        } else {
            Err(HttpError::AuthenticationFailed(
                "Invalid authorization header format".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::new(
            "test-secret".to_string(),
            24,
            "test-issuer".to_string(),
        ))
    }

    #[test]
    fn token_roundtrip_preserves_claim_set() {
        let service = service();

        let token = service
            .generate_token("user-123", "user@example.org", false, true)
            .unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "user@example.org");
        assert!(!claims.owner);
        assert!(claims.executive);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service();

        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: "user".to_string(),
            email: "user@example.org".to_string(),
            owner: false,
            executive: false,
            exp: past.timestamp(),
            iat: past.timestamp(),
            iss: service.config.issuer.clone(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &service.encoding_key).unwrap();

        let result = service.validate_token(&token);
        match result {
            Err(HttpError::AuthenticationFailed(msg)) => {
                assert!(msg.to_lowercase().contains("expired"));
            }
            _ => panic!("Expected authentication failed error"),
        }
    }

    #[test]
    fn bearer_prefix_is_required() {
        let service = service();

        assert_eq!(
            service.extract_bearer_token("Bearer abc123").unwrap(),
            "abc123"
        );
        assert!(service.extract_bearer_token("Basic abc123").is_err());
        assert!(service.extract_bearer_token("abc123").is_err());
    }
}
