//! # stratum-migrations
//!
//! The stratum migration engine: versioned, reversible schema changesets
//! applied against a relational store.
//!
//! ## Architecture
//!
//! - [`Operation`] is a single reversible DDL/DML primitive with an optional
//!   idempotency [`Guard`].
//! - [`ChangeSet`] is an ordered list of operations under a monotonic
//!   [`Version`]; its backward list is derived, never authored.
//! - [`Registry`] is the explicit, sorted view over all known changesets;
//!   [`ChangeSetLoader`] builds one from a directory of changeset files.
//! - [`Ledger`] is the durable record of applied versions (with checksums
//!   for drift detection).
//! - [`Planner`] computes the ordered [`Plan`] for a [`Target`].
//! - [`Executor`] runs a plan: one migration lock per plan, one transaction
//!   per changeset, ledger writes inside that transaction, fail-fast halt.
//! - [`SchemaEditor`] renders operations as SQL for one dialect
//!   (SQLite, PostgreSQL).
//!
//! ## Module Overview
//!
//! - [`operation`] - operations, payload specs, guards
//! - [`changeset`] - `Version`, `ChangeSet`, checksums
//! - [`registry`] - `Registry`
//! - [`loader`] - `ChangeSetLoader` for filesystem discovery
//! - [`ledger`] - the `stratum_migrations` table
//! - [`planner`] - `Planner`, `Plan`, `Target`
//! - [`schema_editor`] - `SchemaEditor` and dialect implementations
//! - [`executor`] - `Executor`, `ExecutorOptions`, `ExecutionReport`
//! - [`lock`] - the cross-process migration lock

// Clippy overrides appropriate for a DDL generation / migration crate.
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod changeset;
pub mod executor;
pub mod ledger;
pub mod loader;
pub mod lock;
pub mod operation;
pub mod planner;
pub mod registry;
pub mod schema_editor;

// Re-export key types at the crate root.
pub use changeset::{ChangeSet, Version};
pub use executor::{ExecutionReport, Executor, ExecutorOptions};
pub use ledger::{Ledger, LedgerEntry};
pub use loader::ChangeSetLoader;
pub use lock::MigrationLock;
pub use operation::{
    ColumnSpec, ColumnType, ForeignKeySpec, Guard, IndexSpec, Operation, OperationKind,
    ReferentialAction, TableSpec,
};
pub use planner::{Direction, Plan, PlanStep, Planner, Target};
pub use registry::Registry;
pub use schema_editor::{
    editor_for_vendor, PostgresSchemaEditor, SchemaEditor, SqliteSchemaEditor, SqlStatement,
};
