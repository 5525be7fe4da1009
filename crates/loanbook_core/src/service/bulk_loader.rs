//! Bulk account loading.
//!
//! # Responsibility
//! - Deduplicate, normalize and insert a batch of raw records.
//!
//! # Invariants
//! - Empty batches are rejected before touching storage.
//! - Dedup is stable by `account_id`: the first occurrence wins.
//! - Validation is all-or-nothing: every surviving row is normalized before
//!   the first write, and one invalid row aborts the batch with no writes.
//! - Inserts are not transactional across rows. A duplicate id is reported
//!   per row and the batch continues; a storage failure stops the batch and
//!   leaves earlier rows persisted.

use crate::error::ErrorKind;
use crate::model::account::{Account, AccountId, ValidationError};
use crate::model::normalize::{normalize_record, parse_account_id, NormalizeOptions};
use crate::model::raw::RawRecord;
use crate::repo::account_repo::{AccountRepository, RepoError};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type BulkLoadResult<T> = Result<T, BulkLoadError>;

/// Batch-level failure.
#[derive(Debug)]
pub enum BulkLoadError {
    /// The batch had no rows.
    EmptyBatch,
    /// A row failed validation; nothing was written.
    InvalidRow {
        /// 1-based position in the input batch.
        row: usize,
        account_id: Option<AccountId>,
        error: ValidationError,
    },
    /// Storage failed mid-batch; `inserted` rows were already committed.
    Interrupted { inserted: usize, source: RepoError },
}

impl BulkLoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyBatch => ErrorKind::EmptyBatch,
            Self::InvalidRow { .. } => ErrorKind::Validation,
            Self::Interrupted { source, .. } => source.kind(),
        }
    }
}

impl Display for BulkLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBatch => f.write_str("bulk load batch is empty"),
            Self::InvalidRow {
                row,
                account_id: Some(id),
                error,
            } => write!(f, "row {row} (account_id {id}): {error}"),
            Self::InvalidRow {
                row,
                account_id: None,
                error,
            } => write!(f, "row {row}: {error}"),
            Self::Interrupted { inserted, source } => write!(
                f,
                "bulk load stopped after {inserted} inserted row(s): {source}"
            ),
        }
    }
}

impl Error for BulkLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyBatch => None,
            Self::InvalidRow { error, .. } => Some(error),
            Self::Interrupted { source, .. } => Some(source),
        }
    }
}

/// Why one row of an otherwise successful batch was not inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFailureReason {
    DuplicateKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub account_id: AccountId,
    pub reason: RowFailureReason,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkLoadReport {
    /// Rows committed to storage.
    pub inserted: usize,
    /// Input rows dropped by in-batch dedup.
    pub deduplicated: usize,
    /// Rows rejected by storage, in input order.
    pub failures: Vec<RowFailure>,
}

/// Loads batches of raw records through a repository.
pub struct BulkLoader<R: AccountRepository> {
    repo: R,
    options: NormalizeOptions,
}

impl<R: AccountRepository> BulkLoader<R> {
    pub fn new(repo: R, options: NormalizeOptions) -> Self {
        Self { repo, options }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Runs dedup, normalization, schema preparation and inserts.
    pub fn load(&self, records: &[RawRecord]) -> BulkLoadResult<BulkLoadReport> {
        let started_at = Instant::now();
        if records.is_empty() {
            error!("event=bulk_load module=service status=error error_code=empty_batch");
            return Err(BulkLoadError::EmptyBatch);
        }
        info!(
            "event=bulk_load module=service status=start rows={}",
            records.len()
        );

        let survivors = dedup_by_account_id(records)?;
        let deduplicated = records.len() - survivors.len();
        let accounts = self.normalize_all(&survivors)?;

        self.repo
            .prepare_schema()
            .map_err(|source| self.interrupted(0, source))?;

        let mut report = BulkLoadReport {
            deduplicated,
            ..BulkLoadReport::default()
        };
        for account in &accounts {
            match self.repo.insert(account) {
                Ok(()) => report.inserted += 1,
                Err(RepoError::DuplicateKey(account_id)) => report.failures.push(RowFailure {
                    account_id,
                    reason: RowFailureReason::DuplicateKey,
                }),
                Err(source) => return Err(self.interrupted(report.inserted, source)),
            }
        }

        info!(
            "event=bulk_load module=service status=ok duration_ms={} inserted={} deduplicated={} failed={}",
            started_at.elapsed().as_millis(),
            report.inserted,
            report.deduplicated,
            report.failures.len()
        );
        Ok(report)
    }

    fn normalize_all(
        &self,
        survivors: &[(usize, AccountId, &RawRecord)],
    ) -> BulkLoadResult<Vec<Account>> {
        survivors
            .iter()
            .map(|&(row, account_id, raw)| {
                normalize_record(raw, self.options).map_err(|error| {
                    error!(
                        "event=bulk_load module=service status=error error_code=invalid_row row={row} account_id={account_id}"
                    );
                    BulkLoadError::InvalidRow {
                        row,
                        account_id: Some(account_id),
                        error,
                    }
                })
            })
            .collect()
    }

    fn interrupted(&self, inserted: usize, source: RepoError) -> BulkLoadError {
        error!(
            "event=bulk_load module=service status=error error_code=storage inserted={inserted} error={source}"
        );
        BulkLoadError::Interrupted { inserted, source }
    }
}

/// Keeps the first record per `account_id`, preserving input order.
///
/// Returns `(row, account_id, record)` with 1-based rows. A record whose id
/// cannot be parsed fails the whole batch.
pub fn dedup_by_account_id(
    records: &[RawRecord],
) -> BulkLoadResult<Vec<(usize, AccountId, &RawRecord)>> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut survivors = Vec::with_capacity(records.len());

    for (index, raw) in records.iter().enumerate() {
        let row = index + 1;
        let account_id = parse_account_id(raw).map_err(|error| BulkLoadError::InvalidRow {
            row,
            account_id: None,
            error,
        })?;

        if seen.insert(account_id) {
            survivors.push((row, account_id, raw));
        } else {
            debug!(
                "event=bulk_dedup module=service status=dropped row={row} account_id={account_id}"
            );
        }
    }

    Ok(survivors)
}
