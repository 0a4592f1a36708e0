//! Changeset discovery from the filesystem.
//!
//! The [`ChangeSetLoader`] scans a directory for changeset files and builds a
//! [`Registry`] from them. Files are named after their version identifier:
//!
//! ```text
//! migrations/
//!   20260207005736_initial_create.json
//!   20260209204235_add_widget_color.json
//! ```
//!
//! The filename stem is the version (validated at load time); the file body
//! is a JSON object with the forward operation list.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use stratum_core::{StratumError, StratumResult};

use crate::changeset::ChangeSet;
use crate::operation::Operation;
use crate::registry::Registry;

/// The on-disk body of a changeset file.
#[derive(Debug, Deserialize)]
struct ChangeSetFile {
    /// The forward operations, in application order.
    operations: Vec<Operation>,
}

/// Discovers and loads changesets from a directory.
pub struct ChangeSetLoader {
    /// The directory containing changeset files.
    dir: PathBuf,
}

impl ChangeSetLoader {
    /// Creates a loader for the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this loader scans.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scans the directory and builds a registry.
    ///
    /// A nonexistent directory yields an empty registry. Files without a
    /// `.json` extension are ignored; a `.json` file with a malformed name
    /// or body is an error.
    pub fn load(&self) -> StratumResult<Registry> {
        if !self.dir.exists() {
            return Ok(Registry::empty());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            StratumError::Configuration(format!(
                "cannot read migrations directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let mut changesets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StratumError::Configuration(format!("cannot read directory entry: {e}"))
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            changesets.push(Self::parse_file(stem, &path)?);
        }

        Registry::new(changesets)
    }

    /// Parses one changeset file.
    fn parse_file(stem: &str, path: &Path) -> StratumResult<ChangeSet> {
        let changeset = ChangeSet::new(stem)?;
        let content = std::fs::read_to_string(path)?;
        let body: ChangeSetFile = serde_json::from_str(&content).map_err(|e| {
            StratumError::Serialization(format!("invalid changeset file {}: {e}", path.display()))
        })?;
        Ok(body
            .operations
            .into_iter()
            .fold(changeset, ChangeSet::add_operation))
    }
}
