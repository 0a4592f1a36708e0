//! The database backend trait.
//!
//! [`DatabaseBackend`] is the seam between the migration engine and a live
//! database. Backends execute parameterized statements, run queries, and
//! expose explicit transaction control. All methods are async because
//! database operations are inherently I/O-bound; backends with synchronous
//! drivers wrap operations in `spawn_blocking`.

use stratum_core::StratumResult;

use crate::row::Row;
use crate::value::Value;

/// The core trait for database backends.
///
/// The engine drives exactly one transaction at a time (one per changeset),
/// so transaction control is three plain methods rather than a transaction
/// handle: [`begin`](Self::begin), [`commit`](Self::commit),
/// [`rollback`](Self::rollback).
#[async_trait::async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Returns the vendor name (e.g., "postgresql", "sqlite").
    fn vendor(&self) -> &str;

    /// Executes a SQL statement that does not return rows.
    ///
    /// Returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[Value]) -> StratumResult<u64>;

    /// Executes a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> StratumResult<Vec<Row>>;

    /// Begins a new database transaction.
    async fn begin(&self) -> StratumResult<()>;

    /// Commits the current transaction.
    async fn commit(&self) -> StratumResult<()>;

    /// Rolls back the current transaction.
    async fn rollback(&self) -> StratumResult<()>;
}
