//! The cross-process migration lock.
//!
//! Two deploying processes must never run overlapping plans against the same
//! database. The lock is a singleton row in `stratum_lock`: acquiring is an
//! INSERT of the one permitted row (a second process hits the primary-key
//! constraint), releasing is a DELETE. Acquisition polls with a short sleep
//! up to a bounded wait, then fails fast with a lock timeout rather than
//! queuing indefinitely.

use std::time::Duration;

use chrono::Utc;
use stratum_core::{StratumError, StratumResult};
use stratum_db::{DatabaseBackend, Value};

/// The lock table name.
pub const LOCK_TABLE: &str = "stratum_lock";

/// The delay between acquisition attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The singleton migration lock.
pub struct MigrationLock;

impl MigrationLock {
    /// Creates the lock table if it does not exist. Idempotent.
    pub async fn ensure_table(backend: &dyn DatabaseBackend) -> StratumResult<()> {
        let sql = match backend.vendor() {
            "sqlite" => {
                "CREATE TABLE IF NOT EXISTS \"stratum_lock\" (\
                    \"id\" INTEGER PRIMARY KEY CHECK (\"id\" = 1), \
                    \"locked_at\" TEXT NOT NULL, \
                    \"locked_by\" TEXT NOT NULL\
                )"
            }
            _ => {
                "CREATE TABLE IF NOT EXISTS \"stratum_lock\" (\
                    \"id\" INTEGER PRIMARY KEY CHECK (\"id\" = 1), \
                    \"locked_at\" TIMESTAMPTZ NOT NULL, \
                    \"locked_by\" TEXT NOT NULL\
                )"
            }
        };
        backend.execute(sql, &[]).await?;
        Ok(())
    }

    /// Acquires the lock, waiting at most `wait`.
    ///
    /// Fails with [`StratumError::LockTimeout`] when another holder does not
    /// release within the bound.
    pub async fn acquire(backend: &dyn DatabaseBackend, wait: Duration) -> StratumResult<()> {
        Self::ensure_table(backend).await?;

        let sql = match backend.vendor() {
            "sqlite" => {
                "INSERT INTO \"stratum_lock\" (\"id\", \"locked_at\", \"locked_by\") \
                 VALUES (1, ?1, ?2)"
            }
            _ => {
                "INSERT INTO \"stratum_lock\" (\"id\", \"locked_at\", \"locked_by\") \
                 VALUES (1, $1, $2)"
            }
        };
        let holder = lock_holder_id();
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            let params = [
                Value::Timestamp(Utc::now()),
                Value::String(holder.clone()),
            ];
            match backend.execute(sql, &params).await {
                Ok(_) => {
                    tracing::debug!("migration lock acquired by {holder}");
                    return Ok(());
                }
                Err(e) => {
                    let msg = e.to_string();
                    let held_elsewhere = msg.contains("UNIQUE constraint failed")
                        || msg.contains("duplicate key");
                    if !held_elsewhere {
                        return Err(e);
                    }
                }
            }
            if tokio::time::Instant::now() >= deadline {
                let holder = Self::current_holder(backend).await.unwrap_or(None);
                return Err(StratumError::LockTimeout(format!(
                    "held by {} after waiting {}s",
                    holder.unwrap_or_else(|| "unknown".to_string()),
                    wait.as_secs()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Releases the lock.
    pub async fn release(backend: &dyn DatabaseBackend) -> StratumResult<()> {
        backend
            .execute("DELETE FROM \"stratum_lock\" WHERE \"id\" = 1", &[])
            .await?;
        tracing::debug!("migration lock released");
        Ok(())
    }

    /// The identity of the current holder, if any.
    pub async fn current_holder(
        backend: &dyn DatabaseBackend,
    ) -> StratumResult<Option<String>> {
        let rows = backend
            .query(
                "SELECT \"locked_by\" FROM \"stratum_lock\" WHERE \"id\" = 1",
                &[],
            )
            .await?;
        rows.first().map(|r| r.get_string("locked_by")).transpose()
    }
}

/// `hostname:pid`, recorded for operator diagnosis.
fn lock_holder_id() -> String {
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    format!("{host}:{}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_db::SqliteBackend;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let backend = SqliteBackend::memory().unwrap();
        MigrationLock::acquire(&backend, Duration::from_secs(1))
            .await
            .unwrap();
        let holder = MigrationLock::current_holder(&backend).await.unwrap();
        assert!(holder.is_some());
        MigrationLock::release(&backend).await.unwrap();
        let holder = MigrationLock::current_holder(&backend).await.unwrap();
        assert!(holder.is_none());
    }

    #[tokio::test]
    async fn test_second_acquire_times_out() {
        let backend = SqliteBackend::memory().unwrap();
        MigrationLock::acquire(&backend, Duration::from_secs(1))
            .await
            .unwrap();
        let err = MigrationLock::acquire(&backend, Duration::from_millis(250))
            .await
            .unwrap_err();
        assert!(matches!(err, StratumError::LockTimeout(_)));
    }

    #[tokio::test]
    async fn test_acquire_after_release() {
        let backend = SqliteBackend::memory().unwrap();
        MigrationLock::acquire(&backend, Duration::from_secs(1))
            .await
            .unwrap();
        MigrationLock::release(&backend).await.unwrap();
        MigrationLock::acquire(&backend, Duration::from_secs(1))
            .await
            .unwrap();
    }
}
