//! Centralized authorization extractors
//!
//! Privileged handlers take one of these extractors instead of re-deriving
//! admit/deny rules; the decision logic itself lives in
//! `quorum_core::access`.

use crate::error::HttpError;
use crate::services::AuthenticatedUser;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use quorum_core::access;

fn identity(parts: &Parts) -> Result<AuthenticatedUser, HttpError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| HttpError::AuthenticationFailed("User not authenticated".to_string()))
}

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity(parts).map(Self)
    }
}

/// Caller holding owner or executive standing.
#[derive(Debug, Clone)]
pub struct Privileged(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Privileged
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = identity(parts)?;
        access::require_privileged(&user.claims)?;
        Ok(Self(user))
    }
}

/// Caller holding owner standing.
#[derive(Debug, Clone)]
pub struct OwnerOnly(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for OwnerOnly
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = identity(parts)?;
        access::require_owner(&user.claims)?;
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use quorum_core::ClaimSet;

    fn parts_with(claims: Option<ClaimSet>) -> Parts {
        let mut request = Request::new(());
        if let Some(claims) = claims {
            request.extensions_mut().insert(AuthenticatedUser {
                id: "u1".to_string(),
                email: "u1@example.org".to_string(),
                claims,
            });
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let mut parts = parts_with(None);
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(HttpError::AuthenticationFailed(_))));
    }

    #[tokio::test]
    async fn member_is_rejected_by_privileged_gate() {
        let mut parts = parts_with(Some(ClaimSet::member()));
        assert!(CurrentUser::from_request_parts(&mut parts, &()).await.is_ok());

        let result = Privileged::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(HttpError::AuthorizationFailed(_))));
    }

    #[tokio::test]
    async fn executive_passes_privileged_but_not_owner_gate() {
        let mut parts = parts_with(Some(ClaimSet::executive()));
        assert!(Privileged::from_request_parts(&mut parts, &()).await.is_ok());

        let result = OwnerOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(HttpError::AuthorizationFailed(_))));
    }

    #[tokio::test]
    async fn owner_passes_every_gate() {
        let mut parts = parts_with(Some(ClaimSet::owner()));
        assert!(CurrentUser::from_request_parts(&mut parts, &()).await.is_ok());
        assert!(Privileged::from_request_parts(&mut parts, &()).await.is_ok());
        assert!(OwnerOnly::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
