//! Application state management

use crate::services::{AuthService, InviteConfig, InviteService, JwtConfig, JwtService};
use quorum_core::{StateBackend, DEFAULT_PAGE_SIZE};
use std::sync::Arc;

/// Shared application state available to all handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// State backend for data persistence
    pub state_backend: Arc<dyn StateBackend>,
    /// Authentication service
    pub auth_service: Arc<AuthService>,
    /// Invitation service
    pub invite_service: Arc<InviteService>,
    /// Page size for post listings
    pub posts_per_page: u32,
}

impl AppState {
    pub fn new(state_backend: Arc<dyn StateBackend>, jwt: JwtConfig, invite: InviteConfig) -> Self {
        let jwt_service = Arc::new(JwtService::new(jwt));
        let auth_service = Arc::new(AuthService::new(jwt_service, state_backend.clone()));
        let invite_service = Arc::new(InviteService::new(invite));

        Self {
            state_backend,
            auth_service,
            invite_service,
            posts_per_page: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_posts_per_page(mut self, posts_per_page: u32) -> Self {
        self.posts_per_page = posts_per_page.max(1);
        self
    }
}
