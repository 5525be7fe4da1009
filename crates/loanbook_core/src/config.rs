//! File-based configuration.
//!
//! # Responsibility
//! - Describe storage, ingest and logging settings in one TOML document.
//! - Provide defaults for every field so an absent file is a valid config.
//!
//! # Invariants
//! - Callers receive the database location through `StoreConfig`; core has no
//!   ambient default connection.

use crate::db::{SchemaPolicy, StoreConfig, DEFAULT_DB_FILE};
use crate::logging::default_log_level;
use crate::model::normalize::NormalizeOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub schema_policy: SchemaPolicy,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            schema_policy: SchemaPolicy::default(),
        }
    }
}

/// Normalization context for bulk loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestProfile {
    /// Typed accounts, no balance category.
    #[default]
    Service,
    /// Type optional, balance category tracked.
    Etl,
}

impl IngestProfile {
    pub fn normalize_options(self) -> NormalizeOptions {
        match self {
            Self::Service => NormalizeOptions::service(),
            Self::Etl => NormalizeOptions::etl(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IngestSettings {
    #[serde(default)]
    pub profile: IngestProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Also echo `warn` and above to stderr when logging to files.
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
            stderr: false,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl AppConfig {
    /// Loads config from `path`; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.database.path.clone()).with_schema_policy(self.database.schema_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, IngestProfile};
    use crate::db::SchemaPolicy;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.path, PathBuf::from("loanbook.db"));
        assert_eq!(config.database.schema_policy, SchemaPolicy::Preserve);
        assert_eq!(config.ingest.profile, IngestProfile::Service);
    }

    #[test]
    fn etl_deployment_parses_replace_policy() {
        let config = AppConfig::parse(
            r#"
            [database]
            path = "/var/lib/loanbook/bank.db"
            schema_policy = "replace"

            [ingest]
            profile = "etl"

            [logging]
            level = "warn"
            "#,
        )
        .unwrap();

        let store = config.store_config();
        assert_eq!(store.db_path, PathBuf::from("/var/lib/loanbook/bank.db"));
        assert_eq!(store.schema_policy, SchemaPolicy::Replace);
        let options = config.ingest.profile.normalize_options();
        assert!(options.track_balance_category);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(AppConfig::parse("[database]\nschema_policy = \"truncate\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loanbook.toml");
        std::fs::write(&path, "[database\npath = 42").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("loanbook.toml"));
    }
}
