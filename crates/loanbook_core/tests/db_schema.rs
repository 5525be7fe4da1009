use loanbook_core::db::schema::{accounts_table_exists, create_schema, reset_schema};
use loanbook_core::db::open_db;
use rusqlite::Connection;

fn insert_row(conn: &Connection, id: i64) {
    conn.execute(
        "INSERT INTO accounts (account_id, account_name, account_type, balance)
         VALUES (?1, 'Holder', 'saving', 1.0);",
        [id],
    )
    .unwrap();
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM accounts;", [], |row| row.get(0)).unwrap()
}

#[test]
fn create_schema_is_idempotent_and_preserves_rows() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("schema.db")).unwrap();

    assert!(!accounts_table_exists(&conn).unwrap());
    create_schema(&conn).unwrap();
    assert!(accounts_table_exists(&conn).unwrap());

    insert_row(&conn, 1);
    create_schema(&conn).unwrap();
    assert_eq!(row_count(&conn), 1);
}

#[test]
fn reset_schema_discards_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db(dir.path().join("schema.db")).unwrap();
    create_schema(&conn).unwrap();
    insert_row(&conn, 1);
    insert_row(&conn, 2);

    reset_schema(&mut conn).unwrap();
    assert!(accounts_table_exists(&conn).unwrap());
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn table_checks_reject_rows_that_bypass_validation() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("schema.db")).unwrap();
    create_schema(&conn).unwrap();

    let negative = conn.execute(
        "INSERT INTO accounts (account_id, account_name, account_type, balance)
         VALUES (1, 'Holder', 'saving', -1.0);",
        [],
    );
    assert!(negative.is_err());

    let bad_type = conn.execute(
        "INSERT INTO accounts (account_id, account_name, account_type, balance)
         VALUES (2, 'Holder', 'fixed', 1.0);",
        [],
    );
    assert!(bad_type.is_err());
}
