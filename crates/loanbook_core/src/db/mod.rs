//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for loanbook core.
//! - Create (or, for the ETL profile, recreate) the `accounts` table.
//!
//! # Invariants
//! - The table identifier is a compile-time constant, never caller input.
//! - Schema creation never drops data unless `SchemaPolicy::Replace` is chosen.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::open_db;

pub type DbResult<T> = Result<T, DbError>;

/// Default database file used when no configuration overrides it.
pub const DEFAULT_DB_FILE: &str = "loanbook.db";

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// How schema preparation treats an existing `accounts` table before a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Create the table if absent and append rows.
    #[default]
    Preserve,
    /// Drop and recreate the table, discarding previous rows.
    Replace,
}

impl SchemaPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Replace => "replace",
        }
    }
}

/// Storage location and schema policy for one `accounts` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub schema_policy: SchemaPolicy,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            schema_policy: SchemaPolicy::Preserve,
        }
    }

    pub fn with_schema_policy(mut self, schema_policy: SchemaPolicy) -> Self {
        self.schema_policy = schema_policy;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_FILE)
    }
}
