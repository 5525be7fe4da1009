//! Core domain logic for loanbook.
//! This crate is the single source of truth for account invariants and
//! loan eligibility rules.

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, IngestProfile, LoggingSettings};
pub use db::{SchemaPolicy, StoreConfig};
pub use error::ErrorKind;
pub use ingest::csv_source::{read_csv_from_reader, read_csv_records, SourceError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, AccountType, BalanceCategory, ValidationError};
pub use model::normalize::{normalize_record, NormalizeOptions};
pub use model::raw::RawRecord;
pub use repo::account_repo::{AccountRepository, RepoError, RepoResult, SqliteAccountRepository};
pub use service::account_service::{AccountService, ServiceError, ServiceResult};
pub use service::bulk_loader::{
    BulkLoadError, BulkLoadReport, BulkLoader, RowFailure, RowFailureReason,
};
pub use service::eligibility::{
    evaluate_eligibility, presence_only_eligibility, CredentialKind, Credentials, EligibilityError,
    LoanProduct,
};
