//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the single `accounts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every call opens its own connection and drops it before returning.
//! - Write paths call `Account::validate()` before SQL mutations.
//! - Primary-key collisions surface as `DuplicateKey`, never as `Db`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::schema::{self, accounts_table_exists};
use crate::db::{open_db, DbError, StoreConfig};
use crate::error::ErrorKind;
use crate::model::account::{Account, AccountId, AccountType, BalanceCategory, ValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    account_id,
    account_name,
    account_type,
    balance,
    pan_number,
    tan_number,
    balance_category
FROM accounts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for account persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    DuplicateKey(AccountId),
    Db(DbError),
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Self::Db(_) | Self::InvalidData(_) => ErrorKind::Storage,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateKey(id) => write!(f, "account_id already exists: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted account data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for account CRUD operations.
pub trait AccountRepository {
    /// Creates `accounts` if absent. Never drops data.
    fn create_schema(&self) -> RepoResult<()>;
    /// Prepares `accounts` per the configured `SchemaPolicy` ahead of a load.
    fn prepare_schema(&self) -> RepoResult<()>;
    fn get_all(&self) -> RepoResult<Vec<Account>>;
    fn get_by_id(&self, id: AccountId) -> RepoResult<Option<Account>>;
    fn insert(&self, account: &Account) -> RepoResult<()>;
    /// Returns `true` when a row was removed.
    fn delete(&self, id: AccountId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<usize>;
}

/// SQLite-backed account repository.
///
/// Holds configuration only; connections live for a single call.
#[derive(Debug, Clone)]
pub struct SqliteAccountRepository {
    config: StoreConfig,
}

impl SqliteAccountRepository {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Returns whether `accounts` currently exists.
    pub fn schema_exists(&self) -> RepoResult<bool> {
        let conn = self.connect()?;
        Ok(accounts_table_exists(&conn)?)
    }

    fn connect(&self) -> RepoResult<Connection> {
        Ok(open_db(&self.config.db_path)?)
    }
}

impl AccountRepository for SqliteAccountRepository {
    fn create_schema(&self) -> RepoResult<()> {
        let conn = self.connect()?;
        schema::create_schema(&conn)?;
        Ok(())
    }

    fn prepare_schema(&self) -> RepoResult<()> {
        let mut conn = self.connect()?;
        schema::prepare_schema(&mut conn, self.config.schema_policy)?;
        debug!(
            "event=schema_prepare module=repo status=ok policy={}",
            self.config.schema_policy.as_str()
        );
        Ok(())
    }

    fn get_all(&self) -> RepoResult<Vec<Account>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{ACCOUNT_SELECT_SQL} ORDER BY account_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();

        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }

        Ok(accounts)
    }

    fn get_by_id(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE account_id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }

        Ok(None)
    }

    fn insert(&self, account: &Account) -> RepoResult<()> {
        account.validate()?;

        let conn = self.connect()?;
        let result = conn.execute(
            "INSERT INTO accounts (
                account_id,
                account_name,
                account_type,
                balance,
                pan_number,
                tan_number,
                balance_category
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                account.account_id,
                account.account_name.as_str(),
                account.account_type.map(AccountType::as_str),
                account.balance,
                account.pan_number.as_deref(),
                account.tan_number.as_deref(),
                account.balance_category.map(BalanceCategory::as_str),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_primary_key_violation(&err) => {
                warn!(
                    "event=account_insert module=repo status=error error_code=duplicate_key account_id={}",
                    account.account_id
                );
                Err(RepoError::DuplicateKey(account.account_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn delete(&self, id: AccountId) -> RepoResult<bool> {
        let conn = self.connect()?;
        let changed = conn.execute("DELETE FROM accounts WHERE account_id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn count(&self) -> RepoResult<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let account_type = match row.get::<_, Option<String>>("account_type")? {
        Some(value) => Some(AccountType::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid account type `{value}` in accounts.account_type"
            ))
        })?),
        None => None,
    };

    let balance_category = match row.get::<_, Option<String>>("balance_category")? {
        Some(value) => Some(BalanceCategory::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid balance category `{value}` in accounts.balance_category"
            ))
        })?),
        None => None,
    };

    let account = Account {
        account_id: row.get("account_id")?,
        account_name: row.get("account_name")?,
        account_type,
        balance: row.get("balance")?,
        pan_number: row.get("pan_number")?,
        tan_number: row.get("tan_number")?,
        balance_category,
    };
    account
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("account {}: {err}", account.account_id)))?;
    Ok(account)
}
