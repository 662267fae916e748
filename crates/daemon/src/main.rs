use anyhow::Result;
use clap::Parser;
use quorum_core::StateBackend;
use quorum_daemon::{bootstrap, server, Settings};
use quorum_http::services::{InviteConfig, JwtConfig};
use quorum_http::AppState;
use quorum_sqlx::SqliteStateBackend;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Quorum daemon - membership organization backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quorum=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match cli.config {
        Some(path) => {
            info!("Loading configuration from: {path}");
            Settings::from_file(&path)?
        }
        None => Settings::from_env()?,
    };

    if settings.auth.jwt_secret == "insecure-dev-secret" {
        warn!("Using the default token secret; set QUORUM_AUTH__JWT_SECRET in production");
    }

    let backend: Arc<dyn StateBackend> =
        Arc::new(SqliteStateBackend::new(&settings.database.url).await?);

    if let Some(email) = &settings.bootstrap.owner_email {
        bootstrap::ensure_owner(
            backend.as_ref(),
            email,
            settings.bootstrap.owner_password.as_deref(),
        )
        .await?;
    }

    let jwt = JwtConfig::new(
        settings.auth.jwt_secret.clone(),
        settings.auth.token_expiry_hours,
        settings.auth.issuer.clone(),
    );
    let invite = InviteConfig {
        frontend_url: settings.invite.frontend_url.clone(),
        committees: settings.invite.committees.clone(),
        token_ttl_hours: settings.invite.token_ttl_hours,
        mail_subject: settings.invite.mail_subject.clone(),
    };
    let state =
        AppState::new(backend, jwt, invite).with_posts_per_page(settings.posts.per_page);

    server::serve(&settings.server, state).await?;

    Ok(())
}
