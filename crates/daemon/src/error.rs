use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("State error: {0}")]
    State(#[from] quorum_core::Error),

    #[error("HTTP server error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
