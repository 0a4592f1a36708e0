//! SQLite database backend using `rusqlite`.
//!
//! Provides [`SqliteBackend`], which implements
//! [`DatabaseBackend`](crate::backend::DatabaseBackend) using `rusqlite`
//! wrapped in `tokio::task::spawn_blocking` for async compatibility.
//!
//! Features:
//! - WAL mode enabled by default for file-based databases
//! - In-memory database support via `:memory:` path (great for testing)
//! - Simple `Mutex`-based concurrency control

use std::path::PathBuf;
use std::sync::Arc;

use stratum_core::{StratumError, StratumResult};
use tokio::sync::Mutex;

use crate::backend::DatabaseBackend;
use crate::row::Row;
use crate::value::Value;

/// A SQLite database backend.
///
/// Uses `rusqlite` behind an async `Mutex`; all operations run via
/// `tokio::task::spawn_blocking` to avoid blocking the async runtime.
pub struct SqliteBackend {
    /// The path to the database file (or ":memory:").
    path: PathBuf,
    /// The connection, guarded by an async mutex.
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteBackend {
    /// Opens a new SQLite database at the given path.
    ///
    /// If the path is `:memory:`, an in-memory database is created.
    /// WAL journal mode is enabled for file-based databases.
    pub fn open(path: impl Into<PathBuf>) -> StratumResult<Self> {
        let path = path.into();
        let conn = if path.to_str() == Some(":memory:") {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| StratumError::Operational(format!("SQLite open failed: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| StratumError::Operational(format!("Failed to set pragmas: {e}")))?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database (convenience constructor).
    pub fn memory() -> StratumResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Binds engine `Value` types to a `rusqlite` statement.
    fn bind_params(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[Value],
    ) -> StratumResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Bytes(b) => stmt.raw_bind_parameter(idx, b.as_slice()),
                Value::Timestamp(ts) => stmt.raw_bind_parameter(idx, ts.to_rfc3339().as_str()),
            }
            .map_err(|e| StratumError::Database(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    /// Converts a `rusqlite::Row` to our generic `Row`.
    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> Row {
        let values: Vec<Value> = column_names
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let val_ref = sqlite_row
                    .get_ref(i)
                    .unwrap_or(rusqlite::types::ValueRef::Null);
                match val_ref {
                    rusqlite::types::ValueRef::Null => Value::Null,
                    rusqlite::types::ValueRef::Integer(v) => Value::Int(v),
                    rusqlite::types::ValueRef::Real(v) => Value::Float(v),
                    rusqlite::types::ValueRef::Text(b) => {
                        Value::String(String::from_utf8_lossy(b).to_string())
                    }
                    rusqlite::types::ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
                }
            })
            .collect();

        Row::new(column_names.to_vec(), values)
    }
}

#[async_trait::async_trait]
impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> StratumResult<u64> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| StratumError::Database(format!("{e}")))?;
            Self::bind_params(&mut stmt, &params)?;
            let count = stmt
                .raw_execute()
                .map_err(|e| StratumError::Database(format!("{e}")))?;
            Ok(count as u64)
        })
        .await
        .map_err(|e| StratumError::Database(format!("Task join error: {e}")))?
    }

    async fn query(&self, sql: &str, params: &[Value]) -> StratumResult<Vec<Row>> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| StratumError::Database(format!("{e}")))?;
            let column_names: Vec<String> =
                stmt.column_names().iter().map(ToString::to_string).collect();
            Self::bind_params(&mut stmt, &params)?;

            let mut rows_out = Vec::new();
            let mut raw = stmt.raw_query();
            while let Some(row) = raw
                .next()
                .map_err(|e| StratumError::Database(format!("{e}")))?
            {
                rows_out.push(Self::convert_row(row, &column_names));
            }
            Ok(rows_out)
        })
        .await
        .map_err(|e| StratumError::Database(format!("Task join error: {e}")))?
    }

    async fn begin(&self) -> StratumResult<()> {
        self.execute("BEGIN", &[]).await.map(|_| ())
    }

    async fn commit(&self) -> StratumResult<()> {
        self.execute("COMMIT", &[]).await.map(|_| ())
    }

    async fn rollback(&self) -> StratumResult<()> {
        self.execute("ROLLBACK", &[]).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory() {
        let backend = SqliteBackend::memory().unwrap();
        assert_eq!(backend.vendor(), "sqlite");
    }

    #[tokio::test]
    async fn test_execute_and_query() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[])
            .await
            .unwrap();
        let affected = backend
            .execute(
                "INSERT INTO t (id, name) VALUES (?1, ?2)",
                &[Value::Int(1), Value::String("alpha".into())],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = backend
            .query("SELECT id, name FROM t", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id").unwrap(), &Value::Int(1));
        assert_eq!(rows[0].get_string("name").unwrap(), "alpha");
    }

    #[tokio::test]
    async fn test_transaction_rollback() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[])
            .await
            .unwrap();

        backend.begin().await.unwrap();
        backend
            .execute("INSERT INTO t (id) VALUES (1)", &[])
            .await
            .unwrap();
        backend.rollback().await.unwrap();

        let rows = backend.query("SELECT id FROM t", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_commit() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &[])
            .await
            .unwrap();

        backend.begin().await.unwrap();
        backend
            .execute("INSERT INTO t (id) VALUES (1)", &[])
            .await
            .unwrap();
        backend.commit().await.unwrap();

        let rows = backend.query("SELECT id FROM t", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_null_round_trip() {
        let backend = SqliteBackend::memory().unwrap();
        backend
            .execute("CREATE TABLE t (v TEXT)", &[])
            .await
            .unwrap();
        backend
            .execute("INSERT INTO t (v) VALUES (?1)", &[Value::Null])
            .await
            .unwrap();
        let rows = backend.query("SELECT v FROM t", &[]).await.unwrap();
        assert!(rows[0].get("v").unwrap().is_null());
    }
}
