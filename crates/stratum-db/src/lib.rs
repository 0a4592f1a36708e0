//! # stratum-db
//!
//! Database backends for the stratum engine: backend-agnostic [`Value`] and
//! [`Row`] types, the async [`DatabaseBackend`] trait, and SQLite /
//! PostgreSQL implementations.
//!
//! The engine is deliberately thin here: it needs parameterized statement
//! execution, queries, and explicit transaction control, nothing more.

#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod postgres;
pub mod row;
pub mod sqlite;
pub mod value;

// Re-export key types at the crate root.
pub use backend::DatabaseBackend;
pub use postgres::PostgresBackend;
pub use row::Row;
pub use sqlite::SqliteBackend;
pub use value::Value;

use stratum_core::{StratumError, StratumResult};

/// Opens a backend for a connection URL.
///
/// Recognized forms:
/// - `sqlite://<path>`, `sqlite::memory:`, or a bare filesystem path
/// - `postgres://...` / `postgresql://...`
pub async fn connect(url: &str) -> StratumResult<Box<dyn DatabaseBackend>> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let backend = PostgresBackend::connect(url).await?;
        return Ok(Box::new(backend));
    }
    if url == "sqlite::memory:" || url == "sqlite://:memory:" {
        return Ok(Box::new(SqliteBackend::memory()?));
    }
    if let Some(path) = url.strip_prefix("sqlite://") {
        return Ok(Box::new(SqliteBackend::open(path)?));
    }
    if url.contains("://") {
        return Err(StratumError::Configuration(format!(
            "unsupported database URL scheme: {url}"
        )));
    }
    // A bare path is treated as a SQLite database file.
    Ok(Box::new(SqliteBackend::open(url)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory() {
        let backend = connect("sqlite::memory:").await.unwrap();
        assert_eq!(backend.vendor(), "sqlite");
    }

    #[tokio::test]
    async fn test_connect_unsupported_scheme() {
        let result = connect("mysql://localhost/db").await;
        assert!(result.is_err());
    }
}
