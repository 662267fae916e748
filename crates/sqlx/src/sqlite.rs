use crate::common::{
    datetime_to_string, MailRow, PermissionRow, PostRow, ProfileRow, TokenRow, UserRow,
};
use async_trait::async_trait;
use quorum_core::{
    BlogPost, Error, Invitation, MailMessage, PasswordToken, PermissionRecord, PostFilter, Result,
    StateBackend, User, UserProfile,
};
use sqlx::{Pool, Sqlite};

pub struct SqliteStateBackend {
    pool: Pool<Sqlite>,
}

impl SqliteStateBackend {
    pub async fn new(database_url: &str) -> Result<Self> {
        use sqlx::sqlite::SqliteConnectOptions;
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::state(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        // In-memory databases exist per connection; a larger pool would hand
        // out empty databases without the migrated schema.
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| Error::state(format!("Failed to connect to database: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::state(format!("Failed to run migrations: {e}")))?;

        tracing::debug!("database schema is up to date");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

async fn insert_user<'e, E>(executor: E, user: &User) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, owner, executive, disabled, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.owner as i32)
    .bind(user.executive as i32)
    .bind(user.disabled as i32)
    .bind(datetime_to_string(user.created_at))
    .bind(datetime_to_string(user.updated_at))
    .execute(executor)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            Error::already_exists(format!("user {} already exists", user.email))
        }
        _ => Error::state(format!("Failed to create user: {e}")),
    })?;

    Ok(())
}

#[async_trait]
impl StateBackend for SqliteStateBackend {
    // User management
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, owner, executive, disabled, created_at, updated_at \
             FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to get user: {e}")))?;

        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, owner, executive, disabled, created_at, updated_at \
             FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to get user by email: {e}")))?;

        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        insert_user(&self.pool, user).await
    }

    async fn set_executive(&self, user_id: &str, executive: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET executive = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(user_id)
            .bind(executive as i32)
            .bind(datetime_to_string(chrono::Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to set executive claim: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("user {user_id}")));
        }
        Ok(())
    }

    async fn set_password_hash(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(user_id)
                .bind(password_hash)
                .bind(datetime_to_string(chrono::Utc::now()))
                .execute(&self.pool)
                .await
                .map_err(|e| Error::state(format!("Failed to set password: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("user {user_id}")));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, owner, executive, disabled, created_at, updated_at \
             FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to list users: {e}")))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    // Profiles
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, email, display_name, photo_url, created_at, updated_at \
             FROM user_profiles WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to get profile: {e}")))?;

        Ok(row.map(UserProfile::from))
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, email, display_name, photo_url, created_at, updated_at \
             FROM user_profiles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to list profiles: {e}")))?;

        Ok(rows.into_iter().map(UserProfile::from).collect())
    }

    // Permission records
    async fn get_permissions(&self, user_id: &str) -> Result<Option<PermissionRecord>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT user_id, committee_id, allowed FROM user_permissions WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to get permissions: {e}")))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut record = PermissionRecord {
            user_id: user_id.to_string(),
            ..Default::default()
        };
        for row in rows {
            record.set(row.committee_id, row.allowed != 0);
        }
        Ok(Some(record))
    }

    async fn set_permission(&self, user_id: &str, committee_id: &str, value: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_permissions (user_id, committee_id, allowed) VALUES (?1, ?2, ?3) \
             ON CONFLICT (user_id, committee_id) DO UPDATE SET allowed = excluded.allowed",
        )
        .bind(user_id)
        .bind(committee_id)
        .bind(value as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to set permission: {e}")))?;

        Ok(())
    }

    // Posts
    async fn create_post(&self, post: &BlogPost) -> Result<()> {
        sqlx::query(
            "INSERT INTO blog_posts (id, author_id, organization, body, visible, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.organization)
        .bind(&post.body)
        .bind(post.visible as i32)
        .bind(datetime_to_string(post.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to create post: {e}")))?;

        Ok(())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<BlogPost>> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, author_id, organization, body, visible, timestamp \
             FROM blog_posts WHERE id = ?1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to get post: {e}")))?;

        Ok(row.map(BlogPost::from))
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BlogPost>> {
        let mut sql = String::from(
            "SELECT id, author_id, organization, body, visible, timestamp FROM blog_posts",
        );
        sql.push_str(where_clause(filter));
        // Tie-break on id so identical timestamps page deterministically
        sql.push_str(" ORDER BY timestamp DESC, id DESC LIMIT ?1 OFFSET ?2");

        let mut query = sqlx::query_as::<_, PostRow>(&sql)
            .bind(limit as i64)
            .bind(offset as i64);
        if let Some(organization) = &filter.organization {
            query = query.bind(organization);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to list posts: {e}")))?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM blog_posts");
        sql.push_str(count_where_clause(filter));

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(organization) = &filter.organization {
            query = query.bind(organization);
        }

        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to count posts: {e}")))?;

        Ok(count as u64)
    }

    async fn update_post_body(&self, post_id: &str, body: &str) -> Result<()> {
        let result = sqlx::query("UPDATE blog_posts SET body = ?2 WHERE id = ?1")
            .bind(post_id)
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to update post: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("post {post_id}")));
        }
        Ok(())
    }

    async fn set_post_visibility(&self, post_id: &str, visible: bool) -> Result<()> {
        let result = sqlx::query("UPDATE blog_posts SET visible = ?2 WHERE id = ?1")
            .bind(post_id)
            .bind(visible as i32)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to set post visibility: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("post {post_id}")));
        }
        Ok(())
    }

    async fn delete_post(&self, post_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to delete post: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("post {post_id}")));
        }
        Ok(())
    }

    // Invitations: one transaction, nothing persists on failure
    async fn create_invitation(&self, invitation: &Invitation) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::state(format!("Failed to begin transaction: {e}")))?;

        let existing = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = ?1")
            .bind(&invitation.user.email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| Error::state(format!("Failed to check email: {e}")))?;
        if existing.is_some() {
            return Err(Error::already_exists(format!(
                "user {} already exists",
                invitation.user.email
            )));
        }

        insert_user(&mut *tx, &invitation.user).await?;

        let profile = &invitation.profile;
        sqlx::query(
            "INSERT INTO user_profiles (user_id, email, display_name, photo_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&profile.user_id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.photo_url)
        .bind(datetime_to_string(profile.created_at))
        .bind(datetime_to_string(profile.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::state(format!("Failed to create profile: {e}")))?;

        for (committee_id, allowed) in &invitation.permissions.permissions {
            sqlx::query(
                "INSERT INTO user_permissions (user_id, committee_id, allowed) VALUES (?1, ?2, ?3)",
            )
            .bind(&invitation.permissions.user_id)
            .bind(committee_id)
            .bind(*allowed as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::state(format!("Failed to create permissions: {e}")))?;
        }

        let token = &invitation.token;
        sqlx::query(
            "INSERT INTO password_tokens (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&token.token_hash)
        .bind(&token.user_id)
        .bind(datetime_to_string(token.expires_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::state(format!("Failed to create password token: {e}")))?;

        if let Some(mail) = &invitation.mail {
            insert_mail(&mut *tx, mail).await?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::state(format!("Failed to commit invitation: {e}")))?;

        Ok(())
    }

    async fn get_password_token(&self, token_hash: &str) -> Result<Option<PasswordToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT token_hash, user_id, expires_at FROM password_tokens WHERE token_hash = ?1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to get password token: {e}")))?;

        Ok(row.map(PasswordToken::from))
    }

    async fn delete_password_token(&self, token_hash: &str) -> Result<()> {
        sqlx::query("DELETE FROM password_tokens WHERE token_hash = ?1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::state(format!("Failed to delete password token: {e}")))?;

        Ok(())
    }

    // Mail outbox
    async fn enqueue_mail(&self, mail: &MailMessage) -> Result<()> {
        insert_mail(&self.pool, mail).await
    }

    async fn list_outbox(&self) -> Result<Vec<MailMessage>> {
        let rows = sqlx::query_as::<_, MailRow>(
            "SELECT id, recipient, subject, text_body, html_body, created_at \
             FROM mail_outbox ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::state(format!("Failed to list outbox: {e}")))?;

        Ok(rows.into_iter().map(MailMessage::from).collect())
    }
}

fn where_clause(filter: &PostFilter) -> &'static str {
    match (&filter.organization, filter.include_hidden) {
        (Some(_), false) => " WHERE organization = ?3 AND visible = 1",
        (Some(_), true) => " WHERE organization = ?3",
        (None, false) => " WHERE visible = 1",
        (None, true) => "",
    }
}

fn count_where_clause(filter: &PostFilter) -> &'static str {
    match (&filter.organization, filter.include_hidden) {
        (Some(_), false) => " WHERE organization = ?1 AND visible = 1",
        (Some(_), true) => " WHERE organization = ?1",
        (None, false) => " WHERE visible = 1",
        (None, true) => "",
    }
}

async fn insert_mail<'e, E>(executor: E, mail: &MailMessage) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO mail_outbox (id, recipient, subject, text_body, html_body, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(&mail.id)
    .bind(&mail.to)
    .bind(&mail.subject)
    .bind(&mail.text_body)
    .bind(&mail.html_body)
    .bind(datetime_to_string(mail.created_at))
    .execute(executor)
    .await
    .map_err(|e| Error::state(format!("Failed to enqueue mail: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn backend() -> SqliteStateBackend {
        SqliteStateBackend::new("sqlite::memory:").await.unwrap()
    }

    fn user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: None,
            owner: false,
            executive: false,
            disabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn post(id: &str, organization: &str, visible: bool, minutes: i64) -> BlogPost {
        BlogPost {
            id: id.to_string(),
            author_id: "author".to_string(),
            organization: organization.to_string(),
            body: "<p>body</p>".to_string(),
            visible,
            timestamp: Utc::now() + Duration::minutes(minutes),
        }
    }

    fn invitation(id: &str, email: &str) -> Invitation {
        let now = Utc::now();
        let committees = vec!["awards".to_string(), "policy".to_string()];
        Invitation {
            user: user(id, email),
            profile: UserProfile::initial(id, email, now),
            permissions: PermissionRecord::all_false(id, &committees),
            token: PasswordToken {
                token_hash: format!("hash-{id}"),
                user_id: id.to_string(),
                expires_at: now + Duration::hours(24),
            },
            mail: Some(MailMessage {
                id: format!("mail-{id}"),
                to: email.to_string(),
                subject: "Welcome".to_string(),
                text_body: "hi".to_string(),
                html_body: "<p>hi</p>".to_string(),
                created_at: now,
            }),
        }
    }

    #[tokio::test]
    async fn user_roundtrip_preserves_claims() {
        let backend = backend().await;
        let mut u = user("u1", "a@x.org");
        u.owner = true;
        backend.create_user(&u).await.unwrap();

        let loaded = backend.get_user("u1").await.unwrap().unwrap();
        assert!(loaded.owner);
        assert!(!loaded.executive);
        assert_eq!(loaded.email, "a@x.org");

        backend.set_executive("u1", true).await.unwrap();
        let loaded = backend.get_user_by_email("a@x.org").await.unwrap().unwrap();
        assert!(loaded.executive);
    }

    #[tokio::test]
    async fn set_executive_on_missing_user_is_not_found() {
        let backend = backend().await;
        let err = backend.set_executive("missing", true).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn invitation_is_atomic_and_rejects_duplicates() {
        let backend = backend().await;
        backend
            .create_invitation(&invitation("u1", "a@x.org"))
            .await
            .unwrap();

        let record = backend.get_permissions("u1").await.unwrap().unwrap();
        assert_eq!(record.permissions.len(), 2);
        assert!(record.permissions.values().all(|allowed| !allowed));
        assert!(backend.get_profile("u1").await.unwrap().is_some());
        assert_eq!(backend.list_outbox().await.unwrap().len(), 1);

        let err = backend
            .create_invitation(&invitation("u2", "a@x.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert!(backend.get_user("u2").await.unwrap().is_none());
        assert!(backend.get_permissions("u2").await.unwrap().is_none());
        assert_eq!(backend.list_outbox().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn permission_upsert_creates_and_updates() {
        let backend = backend().await;
        backend.create_user(&user("u1", "a@x.org")).await.unwrap();

        backend.set_permission("u1", "awards", true).await.unwrap();
        let record = backend.get_permissions("u1").await.unwrap().unwrap();
        assert!(record.allows("awards"));

        backend.set_permission("u1", "awards", false).await.unwrap();
        let record = backend.get_permissions("u1").await.unwrap().unwrap();
        assert!(!record.allows("awards"));
    }

    #[tokio::test]
    async fn post_listing_filters_and_pages() {
        let backend = backend().await;
        for i in 0..8 {
            backend
                .create_post(&post(&format!("p{i}"), "awards", i % 2 == 0, i))
                .await
                .unwrap();
        }
        backend
            .create_post(&post("other", "policy", true, 100))
            .await
            .unwrap();

        let awards_visible = PostFilter {
            organization: Some("awards".to_string()),
            include_hidden: false,
        };
        let listed = backend.list_posts(&awards_visible, 10, 0).await.unwrap();
        assert_eq!(listed.len(), 4);
        assert!(listed.iter().all(|p| p.visible && p.organization == "awards"));
        // Newest first
        assert!(listed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        assert_eq!(backend.count_posts(&awards_visible).await.unwrap(), 4);

        let all = PostFilter {
            organization: None,
            include_hidden: true,
        };
        assert_eq!(backend.count_posts(&all).await.unwrap(), 9);

        let second_page = backend.list_posts(&all, 6, 6).await.unwrap();
        assert_eq!(second_page.len(), 3);
    }

    #[tokio::test]
    async fn visibility_toggle_twice_restores_original() {
        let backend = backend().await;
        backend.create_post(&post("p1", "awards", true, 0)).await.unwrap();

        backend.set_post_visibility("p1", false).await.unwrap();
        assert!(!backend.get_post("p1").await.unwrap().unwrap().visible);

        backend.set_post_visibility("p1", true).await.unwrap();
        assert!(backend.get_post("p1").await.unwrap().unwrap().visible);
    }

    #[tokio::test]
    async fn password_token_consume_flow() {
        let backend = backend().await;
        backend
            .create_invitation(&invitation("u1", "a@x.org"))
            .await
            .unwrap();

        let token = backend
            .get_password_token("hash-u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.user_id, "u1");

        backend.set_password_hash("u1", "pwhash").await.unwrap();
        backend.delete_password_token("hash-u1").await.unwrap();
        assert!(backend.get_password_token("hash-u1").await.unwrap().is_none());
    }
}
