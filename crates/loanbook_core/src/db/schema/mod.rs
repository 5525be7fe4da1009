//! `accounts` table DDL.
//!
//! # Responsibility
//! - Create the table idempotently for the service profile.
//! - Recreate the table for ETL loads running under `SchemaPolicy::Replace`.
//!
//! # Invariants
//! - `create_schema` never drops or rewrites existing rows.
//! - `reset_schema` runs drop + create inside one transaction.

use super::{DbResult, SchemaPolicy};
use log::info;
use rusqlite::Connection;

/// Fixed table identifier used by every statement in core.
pub const ACCOUNTS_TABLE: &str = "accounts";

const CREATE_ACCOUNTS_SQL: &str = include_str!("accounts.sql");

/// Ensures `accounts` exists, leaving existing data untouched.
pub fn create_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_ACCOUNTS_SQL)?;
    Ok(())
}

/// Drops and recreates `accounts`, discarding all rows.
pub fn reset_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch("DROP TABLE IF EXISTS accounts;")?;
    tx.execute_batch(CREATE_ACCOUNTS_SQL)?;
    tx.commit()?;
    info!("event=schema_reset module=db status=ok table={ACCOUNTS_TABLE}");
    Ok(())
}

/// Prepares the table according to `policy` ahead of a load.
pub fn prepare_schema(conn: &mut Connection, policy: SchemaPolicy) -> DbResult<()> {
    match policy {
        SchemaPolicy::Preserve => create_schema(conn),
        SchemaPolicy::Replace => reset_schema(conn),
    }
}

/// Returns whether `accounts` exists in the connected database.
pub fn accounts_table_exists(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [ACCOUNTS_TABLE],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
