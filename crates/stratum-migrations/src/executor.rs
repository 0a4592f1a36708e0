//! Plan execution.
//!
//! The [`Executor`] is the only component that touches the database
//! transactionally. Each changeset in the plan moves through
//! `Pending → Locked → InTransaction → Applying(i) → Committed | RolledBack`:
//! the migration lock is held for the whole plan, each changeset gets its own
//! transaction, operations run strictly in order, and the ledger row is
//! written inside the same transaction as the operations it records.
//!
//! On any operation failure the transaction is rolled back and the remaining
//! plan is halted; changesets that already committed stay committed, so a
//! large migration makes partial, inspectable progress. There are no retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stratum_core::{StratumError, StratumResult};
use stratum_db::DatabaseBackend;

use crate::changeset::{ChangeSet, Version};
use crate::ledger::Ledger;
use crate::lock::MigrationLock;
use crate::operation::Operation;
use crate::planner::{Direction, Plan};
use crate::registry::Registry;
use crate::schema_editor::SchemaEditor;

/// Executor tuning knobs.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Per-statement timeout; a timed-out statement is an operation failure.
    pub statement_timeout: Duration,
    /// Maximum wait for the migration lock.
    pub lock_wait: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            statement_timeout: Duration::from_secs(30),
            lock_wait: Duration::from_secs(10),
        }
    }
}

/// What one executor run did.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Versions applied forward, in order.
    pub applied: Vec<Version>,
    /// Versions reverted, in order.
    pub reverted: Vec<Version>,
    /// Whether the run stopped early on a cancellation signal.
    pub interrupted: bool,
}

impl ExecutionReport {
    /// The total number of changesets that committed.
    pub fn committed(&self) -> usize {
        self.applied.len() + self.reverted.len()
    }
}

/// Runs a [`Plan`] against a live database.
pub struct Executor<'a> {
    backend: &'a dyn DatabaseBackend,
    editor: Box<dyn SchemaEditor>,
    options: ExecutorOptions,
    cancel: Arc<AtomicBool>,
}

impl<'a> Executor<'a> {
    /// Creates an executor over a backend and a matching schema editor.
    pub fn new(
        backend: &'a dyn DatabaseBackend,
        editor: Box<dyn SchemaEditor>,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            backend,
            editor,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The cancellation flag. Setting it stops the run at the next changeset
    /// boundary; the changeset in flight finishes (commit or rollback) first.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Executes a plan.
    ///
    /// An empty plan returns immediately without taking the lock. Otherwise
    /// the lock is acquired before the first changeset and released when the
    /// plan finishes or aborts.
    pub async fn run(&self, registry: &Registry, plan: &Plan) -> StratumResult<ExecutionReport> {
        let mut report = ExecutionReport::default();
        if plan.is_empty() {
            tracing::info!("nothing to do");
            return Ok(report);
        }

        Ledger::ensure_table(self.backend).await?;
        MigrationLock::acquire(self.backend, self.options.lock_wait).await?;

        let result = self.run_locked(registry, plan, &mut report).await;

        if let Err(e) = MigrationLock::release(self.backend).await {
            tracing::warn!("failed to release migration lock: {e}");
        }

        result.map(|()| report)
    }

    /// The per-changeset loop, run while holding the migration lock.
    async fn run_locked(
        &self,
        registry: &Registry,
        plan: &Plan,
        report: &mut ExecutionReport,
    ) -> StratumResult<()> {
        for step in &plan.steps {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!("cancellation requested; stopping before {}", step.version);
                report.interrupted = true;
                return Ok(());
            }

            let changeset = registry.get(&step.version).ok_or_else(|| {
                StratumError::Planning(format!("{} is not in the registry", step.version))
            })?;

            match step.direction {
                Direction::Up => {
                    let ops = changeset.up_operations().to_vec();
                    self.execute_changeset(changeset, &ops, Direction::Up).await?;
                    tracing::info!("applied {}", changeset.version);
                    report.applied.push(changeset.version.clone());
                }
                Direction::Down => {
                    let ops = changeset.down_operations()?;
                    self.execute_changeset(changeset, &ops, Direction::Down).await?;
                    tracing::info!("reverted {}", changeset.version);
                    report.reverted.push(changeset.version.clone());
                }
            }
        }
        Ok(())
    }

    /// Runs one changeset inside one transaction, ledger write included.
    async fn execute_changeset(
        &self,
        changeset: &ChangeSet,
        operations: &[Operation],
        direction: Direction,
    ) -> StratumResult<()> {
        self.backend.begin().await?;

        if let Err(e) = self.apply_operations(changeset, operations).await {
            self.rollback_quietly(changeset).await;
            return Err(e);
        }

        let ledger_write = match direction {
            Direction::Up => {
                Ledger::record_applied(self.backend, &changeset.version, &changeset.checksum())
                    .await
            }
            Direction::Down => Ledger::record_reverted(self.backend, &changeset.version).await,
        };
        if let Err(e) = ledger_write {
            self.rollback_quietly(changeset).await;
            return Err(e);
        }

        if let Err(e) = self.backend.commit().await {
            self.rollback_quietly(changeset).await;
            return Err(e);
        }
        Ok(())
    }

    /// Executes one changeset's operations strictly in order, evaluating
    /// guards immediately before each operation.
    async fn apply_operations(
        &self,
        changeset: &ChangeSet,
        operations: &[Operation],
    ) -> StratumResult<()> {
        let version = changeset.version.as_str();
        for (index, op) in operations.iter().enumerate() {
            if let Some(guard) = &op.guard {
                let (sql, params) = self.editor.guard_query(guard);
                let rows = self
                    .timed(self.backend.query(&sql, &params))
                    .await
                    .map_err(|e| e.at(version, index))?;
                if !guard.is_satisfied(!rows.is_empty()) {
                    tracing::warn!(
                        "{version}[{index}] already satisfied, skipping: {}",
                        op.describe()
                    );
                    continue;
                }
            }

            let statements = self
                .editor
                .render(&op.kind)
                .map_err(|e| e.at(version, index))?;
            for statement in &statements {
                self.timed(self.backend.execute(&statement.sql, &statement.params))
                    .await
                    .map_err(|e| e.at(version, index))?;
            }
            tracing::debug!("{version}[{index}] {}", op.describe());
        }
        Ok(())
    }

    /// Rolls back the current transaction, logging rather than masking the
    /// original failure if the rollback itself fails.
    async fn rollback_quietly(&self, changeset: &ChangeSet) {
        if let Err(e) = self.backend.rollback().await {
            tracing::warn!("rollback of {} failed: {e}", changeset.version);
        }
    }

    /// Applies the statement timeout to a database call.
    async fn timed<T>(
        &self,
        fut: impl std::future::Future<Output = StratumResult<T>> + Send,
    ) -> StratumResult<T> {
        match tokio::time::timeout(self.options.statement_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StratumError::Operational(format!(
                "statement timed out after {}s",
                self.options.statement_timeout.as_secs()
            ))),
        }
    }
}
