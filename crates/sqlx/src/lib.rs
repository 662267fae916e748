//! SQLite persistence for Quorum
//!
//! Implements `quorum_core::StateBackend` over sqlx with embedded
//! migrations.

mod common;
mod sqlite;

pub use sqlite::SqliteStateBackend;
