use loanbook_core::{
    read_csv_from_reader, read_csv_records, AccountRepository, AccountType, BulkLoader, ErrorKind,
    NormalizeOptions, SqliteAccountRepository, StoreConfig,
};
use std::io::Write;

const ACCOUNTS_CSV: &str = "\
account_id, account_name ,account_type,balance,pan_number,tan_number
1,john doe,Saving,1500,ABCDE1234F,
2,,current,-30,,TAN1234567
1,duplicate row,saving,10,XYZ,
3,mary ann,SAVING,2500.5,PQRST6789K,
";

#[test]
fn reader_trims_headers_and_omits_empty_cells() {
    let records = read_csv_from_reader(ACCOUNTS_CSV.as_bytes(), "inline").unwrap();
    assert_eq!(records.len(), 4);

    let second = &records[1];
    assert_eq!(second.get("account_id").unwrap(), "2");
    assert!(second.get("account_name").is_none());
    assert!(second.get("pan_number").is_none());
    assert_eq!(second.get("tan_number").unwrap(), "TAN1234567");
}

#[test]
fn csv_file_loads_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("accounts.csv");
    std::fs::File::create(&csv_path)
        .unwrap()
        .write_all(ACCOUNTS_CSV.as_bytes())
        .unwrap();

    let records = read_csv_records(&csv_path).unwrap();
    let repo = SqliteAccountRepository::new(StoreConfig::new(dir.path().join("bank.db")));
    let loader = BulkLoader::new(repo, NormalizeOptions::service());
    let report = loader.load(&records).unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.deduplicated, 1);

    let repo = loader.repository();
    let first = repo.get_by_id(1).unwrap().unwrap();
    assert_eq!(first.account_name, "John Doe");
    assert_eq!(first.account_type, Some(AccountType::Saving));
    assert_eq!(first.pan_number.as_deref(), Some("ABCDE1234F"));
    assert_eq!(first.tan_number, None);

    let second = repo.get_by_id(2).unwrap().unwrap();
    assert_eq!(second.account_name, "Unknown");
    assert_eq!(second.balance, 0.0);
    assert_eq!(second.account_type, Some(AccountType::Current));
}

#[test]
fn missing_file_is_a_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_csv_records(dir.path().join("absent.csv")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Source);
    assert!(err.origin().ends_with("absent.csv"));
}

#[test]
fn ragged_rows_are_rejected() {
    let input = "account_id,balance\n1,2,3\n";
    let err = read_csv_from_reader(input.as_bytes(), "ragged").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Source);
}

#[test]
fn header_only_file_feeds_an_empty_batch() {
    let input = "account_id,account_name,balance\n";
    let records = read_csv_from_reader(input.as_bytes(), "empty").unwrap();
    assert!(records.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteAccountRepository::new(StoreConfig::new(dir.path().join("bank.db")));
    let err = BulkLoader::new(repo, NormalizeOptions::service())
        .load(&records)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyBatch);
}
