//! Quorum daemon: configuration, owner seeding and server assembly

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod server;

pub use config::Settings;
pub use error::{DaemonError, Result};
