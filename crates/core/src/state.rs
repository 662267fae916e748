use crate::{
    BlogPost, Invitation, MailMessage, PasswordToken, PermissionRecord, PostFilter, Result, User,
    UserProfile,
};
use async_trait::async_trait;

/// Storage seam for all persistent state.
///
/// Backends provide no cross-operation ordering; concurrent updates to the
/// same record are last-write-wins.
#[async_trait]
pub trait StateBackend: Send + Sync {
    // User management
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: &User) -> Result<()>;
    async fn set_executive(&self, user_id: &str, executive: bool) -> Result<()>;
    async fn set_password_hash(&self, user_id: &str, password_hash: &str) -> Result<()>;
    async fn list_users(&self) -> Result<Vec<User>>;

    // Profiles
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    async fn list_profiles(&self) -> Result<Vec<UserProfile>>;

    // Permission records
    async fn get_permissions(&self, user_id: &str) -> Result<Option<PermissionRecord>>;
    /// Upsert of a single committee flag; creates the record when absent.
    async fn set_permission(&self, user_id: &str, committee_id: &str, value: bool) -> Result<()>;

    // Posts
    async fn create_post(&self, post: &BlogPost) -> Result<()>;
    async fn get_post(&self, post_id: &str) -> Result<Option<BlogPost>>;
    /// Newest-first listing window.
    async fn list_posts(&self, filter: &PostFilter, limit: u64, offset: u64)
        -> Result<Vec<BlogPost>>;
    async fn count_posts(&self, filter: &PostFilter) -> Result<u64>;
    async fn update_post_body(&self, post_id: &str, body: &str) -> Result<()>;
    async fn set_post_visibility(&self, post_id: &str, visible: bool) -> Result<()>;
    async fn delete_post(&self, post_id: &str) -> Result<()>;

    // Invitations. The bundle is persisted atomically.
    async fn create_invitation(&self, invitation: &Invitation) -> Result<()>;
    async fn get_password_token(&self, token_hash: &str) -> Result<Option<PasswordToken>>;
    async fn delete_password_token(&self, token_hash: &str) -> Result<()>;

    // Mail outbox
    async fn enqueue_mail(&self, mail: &MailMessage) -> Result<()>;
    async fn list_outbox(&self) -> Result<Vec<MailMessage>>;
}

// Mock implementation for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub StateBackend {}

        #[async_trait]
        impl StateBackend for StateBackend {
            async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
            async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
            async fn create_user(&self, user: &User) -> Result<()>;
            async fn set_executive(&self, user_id: &str, executive: bool) -> Result<()>;
            async fn set_password_hash(&self, user_id: &str, password_hash: &str) -> Result<()>;
            async fn list_users(&self) -> Result<Vec<User>>;
            async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
            async fn list_profiles(&self) -> Result<Vec<UserProfile>>;
            async fn get_permissions(&self, user_id: &str) -> Result<Option<PermissionRecord>>;
            async fn set_permission(&self, user_id: &str, committee_id: &str, value: bool) -> Result<()>;
            async fn create_post(&self, post: &BlogPost) -> Result<()>;
            async fn get_post(&self, post_id: &str) -> Result<Option<BlogPost>>;
            async fn list_posts(&self, filter: &PostFilter, limit: u64, offset: u64) -> Result<Vec<BlogPost>>;
            async fn count_posts(&self, filter: &PostFilter) -> Result<u64>;
            async fn update_post_body(&self, post_id: &str, body: &str) -> Result<()>;
            async fn set_post_visibility(&self, post_id: &str, visible: bool) -> Result<()>;
            async fn delete_post(&self, post_id: &str) -> Result<()>;
            async fn create_invitation(&self, invitation: &Invitation) -> Result<()>;
            async fn get_password_token(&self, token_hash: &str) -> Result<Option<PasswordToken>>;
            async fn delete_password_token(&self, token_hash: &str) -> Result<()>;
            async fn enqueue_mail(&self, mail: &MailMessage) -> Result<()>;
            async fn list_outbox(&self) -> Result<Vec<MailMessage>>;
        }
    }
}
