//! Core error types for stratum.
//!
//! This module provides the [`StratumError`] enum covering every failure class
//! the engine can produce: planning errors, lock errors, apply errors, drift,
//! and the surrounding configuration/IO concerns. All errors are fatal to the
//! invocation that raised them; nothing here is retried automatically.

use thiserror::Error;

/// The primary error type for the stratum engine.
///
/// The variants mirror the engine's failure taxonomy: the planner produces
/// `Planning`/`InvalidPlan`/`UnknownVersion`/`IrreversibleChangeSet`/`Drift`,
/// the registry produces `DuplicateVersion`/`InvalidVersionFormat`, the ledger
/// produces `DuplicateApply`/`NotApplied`, and the executor produces
/// `LockTimeout`/`Apply`. `Database` and `Operational` wrap driver-level
/// failures.
#[derive(Error, Debug)]
pub enum StratumError {
    // ── Planning ─────────────────────────────────────────────────────

    /// The requested target is ambiguous or cannot be planned.
    #[error("Planning error: {0}")]
    Planning(String),

    /// The computed plan would violate the contiguous-prefix invariant,
    /// or the ledger references a changeset absent from the registry.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// The requested target version is not known to the registry.
    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    // ── Registry ─────────────────────────────────────────────────────

    /// Two changesets share the same version identifier.
    #[error("Duplicate changeset version: {0}")]
    DuplicateVersion(String),

    /// A version identifier does not match `<timestamp>_<name>`.
    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    // ── Reversibility / drift ────────────────────────────────────────

    /// A `down` plan would traverse a changeset with no derivable revert.
    #[error("Changeset {0} is irreversible")]
    IrreversibleChangeSet(String),

    /// An applied changeset's content no longer matches its ledger checksum.
    #[error("Checksum drift for {version}: ledger has {ledger}, registry has {registry}")]
    Drift {
        /// The drifted changeset version.
        version: String,
        /// The checksum recorded when the changeset was applied.
        ledger: String,
        /// The checksum of the changeset as currently defined.
        registry: String,
    },

    // ── Execution ────────────────────────────────────────────────────

    /// The migration lock could not be acquired within the configured wait.
    #[error("Migration lock timed out: {0}")]
    LockTimeout(String),

    /// An operation failed against the live database. Carries the changeset
    /// version and zero-based operation index for diagnosis.
    #[error("Apply failed at {version}[{index}]: {source}")]
    Apply {
        /// The changeset that was executing.
        version: String,
        /// The index of the failing operation within the changeset.
        index: usize,
        /// The underlying failure.
        #[source]
        source: Box<StratumError>,
    },

    // ── Ledger ───────────────────────────────────────────────────────

    /// A ledger row for this version already exists (double-apply race).
    #[error("Version {0} is already recorded as applied")]
    DuplicateApply(String),

    /// No ledger row exists for this version (revert of an unapplied changeset).
    #[error("Version {0} is not recorded as applied")]
    NotApplied(String),

    // ── Infrastructure ───────────────────────────────────────────────

    /// A generic database error (statement failure, bind error, bad row).
    #[error("Database error: {0}")]
    Database(String),

    /// An operational database error (connection failure, timeout).
    #[error("Operational error: {0}")]
    Operational(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StratumError {
    /// Wraps an error as an [`StratumError::Apply`] with position context.
    pub fn at(self, version: impl Into<String>, index: usize) -> Self {
        Self::Apply {
            version: version.into(),
            index,
            source: Box::new(self),
        }
    }
}

/// A convenience type alias for `Result<T, StratumError>`.
pub type StratumResult<T> = Result<T, StratumError>;
