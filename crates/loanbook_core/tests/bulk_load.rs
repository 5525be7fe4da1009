use loanbook_core::{
    AccountRepository, BalanceCategory, BulkLoadError, BulkLoader, ErrorKind, NormalizeOptions,
    RawRecord, RowFailure, RowFailureReason, SchemaPolicy, SqliteAccountRepository, StoreConfig,
    ValidationError,
};
use serde_json::json;
use tempfile::TempDir;

fn temp_config() -> (TempDir, StoreConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("bulk.db"));
    (dir, config)
}

fn service_loader(config: StoreConfig) -> BulkLoader<SqliteAccountRepository> {
    BulkLoader::new(
        SqliteAccountRepository::new(config),
        NormalizeOptions::service(),
    )
}

fn record(id: i64, name: &str, balance: f64) -> RawRecord {
    RawRecord::from_json(json!({
        "account_id": id,
        "account_name": name,
        "account_type": "saving",
        "balance": balance,
        "pan_number": format!("P{id}")
    }))
    .unwrap()
}

#[test]
fn empty_batch_is_rejected() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    let err = loader.load(&[]).unwrap_err();
    assert!(matches!(err, BulkLoadError::EmptyBatch));
    assert_eq!(err.kind(), ErrorKind::EmptyBatch);
    assert!(!loader.repository().schema_exists().unwrap());
}

#[test]
fn duplicate_ids_keep_first_occurrence() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    let batch = [
        record(1, "first holder", 10.0),
        record(1, "second holder", 20.0),
        record(2, "other holder", 30.0),
    ];
    let report = loader.load(&batch).unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.deduplicated, 1);
    assert!(report.failures.is_empty());

    let repo = loader.repository();
    assert_eq!(repo.count().unwrap(), 2);
    let kept = repo.get_by_id(1).unwrap().unwrap();
    assert_eq!(kept.account_name, "First Holder");
    assert_eq!(kept.balance, 10.0);
}

#[test]
fn invalid_row_aborts_batch_before_any_write() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    let mut bad = record(3, "bad balance", 0.0);
    bad.insert("balance", "twelve");
    let batch = [record(1, "a", 1.0), record(2, "b", 2.0), bad];

    let err = loader.load(&batch).unwrap_err();
    match &err {
        BulkLoadError::InvalidRow {
            row,
            account_id,
            error,
        } => {
            assert_eq!(*row, 3);
            assert_eq!(*account_id, Some(3));
            assert_eq!(*error, ValidationError::NonNumericBalance);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!loader.repository().schema_exists().unwrap());
}

#[test]
fn unparseable_id_identifies_the_row() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    let batch = [
        record(1, "a", 1.0),
        RawRecord::new().with("account_id", "x1").with("balance", 1),
    ];
    let err = loader.load(&batch).unwrap_err();
    assert!(matches!(
        err,
        BulkLoadError::InvalidRow {
            row: 2,
            account_id: None,
            error: ValidationError::InvalidAccountId
        }
    ));
}

#[test]
fn invalid_duplicate_is_dropped_before_validation() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    let mut shadowed = record(1, "shadow", 0.0);
    shadowed.insert("balance", "not a number");
    let report = loader.load(&[record(1, "kept", 5.0), shadowed]).unwrap();
    assert_eq!(report.inserted, 1);
}

#[test]
fn existing_ids_are_reported_per_row_without_aborting() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    loader.load(&[record(2, "existing", 1.0)]).unwrap();

    let batch = [
        record(1, "a", 1.0),
        record(2, "b", 2.0),
        record(3, "c", 3.0),
    ];
    let report = loader.load(&batch).unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(
        report.failures,
        vec![RowFailure {
            account_id: 2,
            reason: RowFailureReason::DuplicateKey
        }]
    );

    let repo = loader.repository();
    assert_eq!(repo.count().unwrap(), 3);
    assert_eq!(repo.get_by_id(2).unwrap().unwrap().account_name, "Existing");
}

#[test]
fn preserve_policy_appends_across_loads() {
    let (_dir, config) = temp_config();
    let loader = service_loader(config);

    loader.load(&[record(1, "a", 1.0)]).unwrap();
    loader.load(&[record(2, "b", 2.0)]).unwrap();
    assert_eq!(loader.repository().count().unwrap(), 2);
}

#[test]
fn replace_policy_rebuilds_table_on_each_load() {
    let (_dir, config) = temp_config();
    let config = config.with_schema_policy(SchemaPolicy::Replace);
    let loader = BulkLoader::new(
        SqliteAccountRepository::new(config),
        NormalizeOptions::etl(),
    );

    loader
        .load(&[record(1, "a", 100.0), record(2, "b", 900.0)])
        .unwrap();
    let report = loader.load(&[record(3, "c", 5000.0)]).unwrap();
    assert_eq!(report.inserted, 1);

    let accounts = loader.repository().get_all().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].account_id, 3);
    assert_eq!(accounts[0].balance_category, Some(BalanceCategory::High));
}

#[test]
fn storage_failure_keeps_already_inserted_rows() {
    let (dir, config) = temp_config();
    let db_path = dir.path().join("bulk.db");
    let loader = service_loader(config);
    loader.load(&[record(1, "seed", 1.0)]).unwrap();

    // Reject every insert of id >= 100 at the storage layer.
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_high_ids BEFORE INSERT ON accounts
         WHEN NEW.account_id >= 100
         BEGIN SELECT RAISE(ABORT, 'storage refused'); END;",
    )
    .unwrap();
    drop(conn);

    let batch = [
        record(2, "a", 1.0),
        record(100, "b", 1.0),
        record(3, "c", 1.0),
    ];
    let err = loader.load(&batch).unwrap_err();
    match &err {
        BulkLoadError::Interrupted { inserted, .. } => assert_eq!(*inserted, 1),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.kind(), ErrorKind::Storage);

    let repo = loader.repository();
    assert!(repo.get_by_id(2).unwrap().is_some());
    assert!(repo.get_by_id(3).unwrap().is_none());
}
