//! Configuration for the stratum engine and CLI.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file
//! (`stratum.toml`), then environment variables. The engine itself treats the
//! result as opaque beyond "a usable database connection"; everything here is
//! plumbing for the CLI and the executor's timeouts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StratumError, StratumResult};

/// Environment variable naming: `DATABASE_URL` is honored as-is (it is the
/// ecosystem convention); everything else is prefixed `STRATUM_`.
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_MIGRATIONS_DIR: &str = "STRATUM_MIGRATIONS_DIR";
const ENV_LOCK_WAIT: &str = "STRATUM_LOCK_WAIT_SECS";
const ENV_STATEMENT_TIMEOUT: &str = "STRATUM_STATEMENT_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "STRATUM_LOG_LEVEL";

/// The complete configuration for one stratum invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The database connection URL (`sqlite://path` or `postgres://...`).
    pub database_url: String,
    /// Directory containing changeset files.
    pub migrations_dir: PathBuf,
    /// Maximum seconds to wait for the migration lock before failing.
    pub lock_wait_secs: u64,
    /// Per-statement timeout in seconds; a timed-out statement is an
    /// operation failure (rollback, halt).
    pub statement_timeout_secs: u64,
    /// The tracing filter directive (e.g. "info", "stratum=debug").
    pub log_level: String,
    /// Whether to use the human-readable log format.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            migrations_dir: PathBuf::from("migrations"),
            lock_wait_secs: 10,
            statement_timeout_secs: 30,
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

impl Config {
    /// Loads configuration from an optional TOML file, then applies
    /// environment variable overrides.
    ///
    /// A missing file is not an error (defaults apply); an unreadable or
    /// malformed file is.
    pub fn load(path: Option<&Path>) -> StratumResult<Self> {
        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                return Err(StratumError::Configuration(format!(
                    "config file not found: {}",
                    p.display()
                )))
            }
            None => {
                let default_path = Path::new("stratum.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Parses configuration from a TOML file.
    pub fn from_file(path: &Path) -> StratumResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| StratumError::Configuration(format!("invalid config file: {e}")))
    }

    /// Overrides fields from environment variables where set.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_DATABASE_URL) {
            self.database_url = url;
        }
        if let Ok(dir) = std::env::var(ENV_MIGRATIONS_DIR) {
            self.migrations_dir = PathBuf::from(dir);
        }
        if let Ok(secs) = std::env::var(ENV_LOCK_WAIT) {
            if let Ok(parsed) = secs.parse() {
                self.lock_wait_secs = parsed;
            }
        }
        if let Ok(secs) = std::env::var(ENV_STATEMENT_TIMEOUT) {
            if let Ok(parsed) = secs.parse() {
                self.statement_timeout_secs = parsed;
            }
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }

    /// Returns an error if no database URL was provided by any layer.
    pub fn require_database_url(&self) -> StratumResult<&str> {
        if self.database_url.is_empty() {
            return Err(StratumError::Configuration(
                "no database URL configured (set DATABASE_URL or database_url in stratum.toml)"
                    .to_string(),
            ));
        }
        Ok(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.migrations_dir, PathBuf::from("migrations"));
        assert_eq!(config.lock_wait_secs, 10);
        assert_eq!(config.statement_timeout_secs, 30);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            database_url = "sqlite://app.db"
            migrations_dir = "db/changesets"
            lock_wait_secs = 5
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url, "sqlite://app.db");
        assert_eq!(config.migrations_dir, PathBuf::from("db/changesets"));
        assert_eq!(config.lock_wait_secs, 5);
        // Unset fields fall back to defaults
        assert_eq!(config.statement_timeout_secs, 30);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/stratum.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_require_database_url_empty() {
        let config = Config::default();
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn test_require_database_url_set() {
        let config = Config {
            database_url: "sqlite://:memory:".into(),
            ..Config::default()
        };
        assert_eq!(config.require_database_url().unwrap(), "sqlite://:memory:");
    }
}
