//! The applied-changeset ledger.
//!
//! The ledger is a durable table, `stratum_migrations`, recording which
//! changeset versions have run: `(version, applied_at, checksum)`. It is the
//! source of truth for planning. Operators may read it directly; only the
//! engine writes it, and every write happens inside the same transaction as
//! the operations that justify it, so a ledger row can never outlive a failed
//! schema change (or vice versa).

use std::collections::BTreeSet;

use chrono::Utc;
use stratum_core::{StratumError, StratumResult};
use stratum_db::{DatabaseBackend, Value};

use crate::changeset::Version;

/// The ledger table name.
pub const LEDGER_TABLE: &str = "stratum_migrations";

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The applied changeset version.
    pub version: Version,
    /// When the changeset committed, as stored by the database.
    pub applied_at: String,
    /// The checksum of the changeset as it was applied.
    pub checksum: String,
}

/// Reads and writes the `stratum_migrations` table.
///
/// The ledger itself issues no transaction control: `record_applied` and
/// `record_reverted` are called by the executor inside the changeset's
/// transaction.
pub struct Ledger;

impl Ledger {
    /// Creates the ledger table if it does not exist. Idempotent.
    pub async fn ensure_table(backend: &dyn DatabaseBackend) -> StratumResult<()> {
        let sql = match backend.vendor() {
            "sqlite" => {
                "CREATE TABLE IF NOT EXISTS \"stratum_migrations\" (\
                    \"version\" TEXT PRIMARY KEY, \
                    \"applied_at\" TEXT NOT NULL, \
                    \"checksum\" TEXT NOT NULL\
                )"
            }
            _ => {
                "CREATE TABLE IF NOT EXISTS \"stratum_migrations\" (\
                    \"version\" TEXT PRIMARY KEY, \
                    \"applied_at\" TIMESTAMPTZ NOT NULL, \
                    \"checksum\" TEXT NOT NULL\
                )"
            }
        };
        backend.execute(sql, &[]).await?;
        Ok(())
    }

    /// Reads all ledger rows, ascending by version.
    ///
    /// Bootstraps the table first, so a fresh database reads as empty rather
    /// than erroring.
    pub async fn entries(backend: &dyn DatabaseBackend) -> StratumResult<Vec<LedgerEntry>> {
        Self::ensure_table(backend).await?;
        let rows = backend
            .query(
                "SELECT \"version\", \"applied_at\", \"checksum\" \
                 FROM \"stratum_migrations\" ORDER BY \"version\"",
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| {
                let version = Version::parse(&row.get_string("version")?)?;
                let applied_at = match row.get("applied_at")? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let checksum = row.get_string("checksum")?;
                Ok(LedgerEntry {
                    version,
                    applied_at,
                    checksum,
                })
            })
            .collect()
    }

    /// The set of applied versions.
    pub async fn applied_versions(
        backend: &dyn DatabaseBackend,
    ) -> StratumResult<BTreeSet<Version>> {
        Ok(Self::entries(backend)
            .await?
            .into_iter()
            .map(|e| e.version)
            .collect())
    }

    /// The recorded checksum for a version, if it is applied.
    pub async fn checksum_of(
        backend: &dyn DatabaseBackend,
        version: &Version,
    ) -> StratumResult<Option<String>> {
        Self::ensure_table(backend).await?;
        let sql = match backend.vendor() {
            "sqlite" => {
                "SELECT \"checksum\" FROM \"stratum_migrations\" WHERE \"version\" = ?1"
            }
            _ => "SELECT \"checksum\" FROM \"stratum_migrations\" WHERE \"version\" = $1",
        };
        let rows = backend
            .query(sql, &[Value::String(version.to_string())])
            .await?;
        rows.first().map(|r| r.get_string("checksum")).transpose()
    }

    /// Inserts a ledger row for a newly applied changeset.
    ///
    /// Must run inside the changeset's transaction. A pre-existing row for
    /// the version surfaces as [`StratumError::DuplicateApply`], guarding
    /// against double-apply races.
    pub async fn record_applied(
        backend: &dyn DatabaseBackend,
        version: &Version,
        checksum: &str,
    ) -> StratumResult<()> {
        let sql = match backend.vendor() {
            "sqlite" => {
                "INSERT INTO \"stratum_migrations\" (\"version\", \"applied_at\", \"checksum\") \
                 VALUES (?1, ?2, ?3)"
            }
            _ => {
                "INSERT INTO \"stratum_migrations\" (\"version\", \"applied_at\", \"checksum\") \
                 VALUES ($1, $2, $3)"
            }
        };
        let params = [
            Value::String(version.to_string()),
            Value::Timestamp(Utc::now()),
            Value::String(checksum.to_string()),
        ];
        backend.execute(sql, &params).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint failed") || msg.contains("duplicate key") {
                StratumError::DuplicateApply(version.to_string())
            } else {
                e
            }
        })?;
        Ok(())
    }

    /// Deletes the ledger row for a reverted changeset.
    ///
    /// Must run inside the changeset's transaction. A missing row surfaces
    /// as [`StratumError::NotApplied`].
    pub async fn record_reverted(
        backend: &dyn DatabaseBackend,
        version: &Version,
    ) -> StratumResult<()> {
        let sql = match backend.vendor() {
            "sqlite" => "DELETE FROM \"stratum_migrations\" WHERE \"version\" = ?1",
            _ => "DELETE FROM \"stratum_migrations\" WHERE \"version\" = $1",
        };
        let affected = backend
            .execute(sql, &[Value::String(version.to_string())])
            .await?;
        if affected == 0 {
            return Err(StratumError::NotApplied(version.to_string()));
        }
        Ok(())
    }
}
