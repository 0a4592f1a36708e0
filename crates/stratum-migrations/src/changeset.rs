//! Changesets and version identifiers.
//!
//! A [`ChangeSet`] is one atomic, versioned unit of schema change: an ordered
//! forward list of [`Operation`]s under a [`Version`] identifier. The
//! backward list is never authored; [`ChangeSet::down_operations`] derives it
//! by inverting each operation and reversing the order, so the two directions
//! cannot drift apart.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stratum_core::{StratumError, StratumResult};

use crate::operation::Operation;

/// `<sortable-timestamp>_<descriptive-name>`: fourteen digits
/// (YYYYMMDDHHMMSS), an underscore, then an identifier.
static VERSION_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{14}_[A-Za-z][A-Za-z0-9_]*$").expect("valid pattern"));

/// A totally-ordered changeset identifier.
///
/// The timestamp prefix makes lexicographic order chronological, so sorting
/// and comparison operate on the raw string.
///
/// # Examples
///
/// ```
/// use stratum_migrations::changeset::Version;
///
/// let v = Version::parse("20260207005736_initial_create").unwrap();
/// assert_eq!(v.name(), "initial_create");
/// assert!(Version::parse("not_a_version").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Validates and wraps a version identifier.
    pub fn parse(s: &str) -> StratumResult<Self> {
        if VERSION_FORMAT.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(StratumError::InvalidVersionFormat(s.to_string()))
        }
    }

    /// The full identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fourteen-digit timestamp prefix.
    pub fn timestamp(&self) -> &str {
        &self.0[..14]
    }

    /// The descriptive part after the timestamp.
    pub fn name(&self) -> &str {
        &self.0[15..]
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = StratumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = StratumError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.0
    }
}

/// One atomic, versioned unit of schema change.
///
/// Changesets are immutable once shipped; history only grows by appending
/// new versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// The version identifier.
    pub version: Version,
    /// The human-readable name (the version's descriptive part).
    pub name: String,
    /// The forward operations, in application order.
    pub operations: Vec<Operation>,
}

impl ChangeSet {
    /// Creates an empty changeset from a version identifier.
    pub fn new(version: &str) -> StratumResult<Self> {
        let version = Version::parse(version)?;
        let name = version.name().to_string();
        Ok(Self {
            version,
            name,
            operations: Vec::new(),
        })
    }

    /// Adds a forward operation.
    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// The forward operation sequence.
    pub fn up_operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Derives the backward operation sequence: each forward operation
    /// inverted, in reverse order.
    pub fn down_operations(&self) -> StratumResult<Vec<Operation>> {
        self.operations
            .iter()
            .rev()
            .map(|op| {
                op.invert().ok_or_else(|| {
                    StratumError::IrreversibleChangeSet(self.version.to_string())
                })
            })
            .collect()
    }

    /// Whether every forward operation has a derivable inverse.
    pub fn is_reversible(&self) -> bool {
        self.operations.iter().all(Operation::reversible)
    }

    /// The SHA-256 hex digest of the serialized forward operation list.
    ///
    /// Recorded in the ledger at apply time and compared on later runs to
    /// detect a changeset whose content changed after it shipped.
    pub fn checksum(&self) -> String {
        let serialized =
            serde_json::to_string(&self.operations).unwrap_or_else(|_| String::new());
        let digest = Sha256::digest(serialized.as_bytes());
        format!("{digest:x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{ColumnSpec, ColumnType, OperationKind, TableSpec};

    fn sample_changeset() -> ChangeSet {
        ChangeSet::new("20260207005736_create_widgets")
            .unwrap()
            .add_operation(Operation::create_table(
                TableSpec::new("widgets")
                    .column(ColumnSpec::new("id", ColumnType::BigSerial).primary_key()),
            ))
            .add_operation(Operation::add_column(
                "widgets",
                ColumnSpec::new("color", ColumnType::Text).nullable(),
            ))
    }

    // ── Version ─────────────────────────────────────────────────────

    #[test]
    fn test_version_parse_valid() {
        let v = Version::parse("20260207005736_initial_create").unwrap();
        assert_eq!(v.timestamp(), "20260207005736");
        assert_eq!(v.name(), "initial_create");
    }

    #[test]
    fn test_version_parse_camel_case() {
        assert!(Version::parse("20260209213644_AddTeamCollaboration").is_ok());
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("initial_create").is_err());
        assert!(Version::parse("2026_initial").is_err());
        assert!(Version::parse("20260207005736").is_err());
        assert!(Version::parse("20260207005736_").is_err());
        assert!(Version::parse("20260207005736_1leading_digit").is_err());
    }

    #[test]
    fn test_version_ordering_is_chronological() {
        let v1 = Version::parse("20260207005736_first").unwrap();
        let v2 = Version::parse("20260209204235_second").unwrap();
        assert!(v1 < v2);
    }

    #[test]
    fn test_version_serde_rejects_malformed() {
        let result: Result<Version, _> = serde_json::from_str("\"bogus\"");
        assert!(result.is_err());
        let ok: Version = serde_json::from_str("\"20260207005736_ok\"").unwrap();
        assert_eq!(ok.as_str(), "20260207005736_ok");
    }

    // ── ChangeSet ───────────────────────────────────────────────────

    #[test]
    fn test_changeset_new() {
        let cs = ChangeSet::new("20260207005736_initial_create").unwrap();
        assert_eq!(cs.name, "initial_create");
        assert!(cs.operations.is_empty());
    }

    #[test]
    fn test_changeset_rejects_bad_version() {
        assert!(ChangeSet::new("no_timestamp_here").is_err());
    }

    #[test]
    fn test_down_operations_reversed_and_inverted() {
        let cs = sample_changeset();
        let down = cs.down_operations().unwrap();
        assert_eq!(down.len(), 2);
        // The last forward operation is inverted first.
        assert!(matches!(down[0].kind, OperationKind::DropColumn { .. }));
        assert!(matches!(down[1].kind, OperationKind::DropTable { .. }));
    }

    #[test]
    fn test_down_operations_irreversible() {
        let cs = ChangeSet::new("20260207005736_one_way")
            .unwrap()
            .add_operation(Operation::raw_irreversible("UPDATE widgets SET color = NULL"));
        assert!(!cs.is_reversible());
        let err = cs.down_operations().unwrap_err();
        assert!(matches!(err, StratumError::IrreversibleChangeSet(_)));
    }

    #[test]
    fn test_checksum_stable() {
        let a = sample_changeset();
        let b = sample_changeset();
        assert_eq!(a.checksum(), b.checksum());
        assert_eq!(a.checksum().len(), 64);
        assert!(a.checksum().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_changes_with_content() {
        let a = sample_changeset();
        let b = sample_changeset().add_operation(Operation::raw("SELECT 1", "SELECT 1"));
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_checksum_ignores_version() {
        let mut a = sample_changeset();
        a.version = Version::parse("20260301000000_renamed").unwrap();
        assert_eq!(a.checksum(), sample_changeset().checksum());
    }
}
