//! Account use-case service.
//!
//! # Responsibility
//! - Provide single-record entry points for API-layer callers.
//! - Combine normalization, repository calls and eligibility decisions.
//!
//! # Invariants
//! - Single-record inserts always go through `normalize_record`.
//! - Missing accounts surface as `NotFound`, distinct from storage failures.
//! - Service layer remains storage-agnostic.

use crate::error::ErrorKind;
use crate::model::account::{Account, AccountId, ValidationError};
use crate::model::normalize::{normalize_record, NormalizeOptions};
use crate::model::raw::RawRecord;
use crate::repo::account_repo::{AccountRepository, RepoError};
use crate::service::eligibility::{
    evaluate_eligibility, presence_only_eligibility, Credentials, EligibilityError, LoanProduct,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for account use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input record failed normalization.
    Validation(ValidationError),
    /// Target account does not exist.
    NotFound(AccountId),
    /// Eligibility was refused.
    Eligibility(EligibilityError),
    /// Persistence-layer failure, including duplicate keys.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(err) => err.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Eligibility(err) => err.kind(),
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "account not found: {id}"),
            Self::Eligibility(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Eligibility(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<EligibilityError> for ServiceError {
    fn from(value: EligibilityError) -> Self {
        Self::Eligibility(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service wrapper for account operations.
pub struct AccountService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a service and ensures the `accounts` table exists.
    pub fn open(repo: R) -> ServiceResult<Self> {
        repo.create_schema()?;
        Ok(Self { repo })
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists every stored account.
    pub fn list_accounts(&self) -> ServiceResult<Vec<Account>> {
        Ok(self.repo.get_all()?)
    }

    /// Gets one account by id, failing with `NotFound` when absent.
    pub fn get_account(&self, id: AccountId) -> ServiceResult<Account> {
        self.repo.get_by_id(id)?.ok_or(ServiceError::NotFound(id))
    }

    /// Normalizes and inserts one record, returning the stored form.
    ///
    /// # Contract
    /// - Uses `NormalizeOptions::service()`: `account_type` is required.
    /// - Existing ids fail with `DuplicateKey` and leave the store unchanged.
    pub fn add_account(&self, raw: &RawRecord) -> ServiceResult<Account> {
        let account = normalize_record(raw, NormalizeOptions::service())?;
        self.repo.insert(&account)?;
        info!(
            "event=account_add module=service status=ok account_id={}",
            account.account_id
        );
        Ok(account)
    }

    /// Deletes one account by id.
    ///
    /// Returns `NotFound` when no row was removed.
    pub fn delete_account(&self, id: AccountId) -> ServiceResult<()> {
        if self.repo.delete(id)? {
            info!("event=account_delete module=service status=ok account_id={id}");
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }

    /// Evaluates loan eligibility against presented credentials.
    pub fn loan_eligibility(
        &self,
        id: AccountId,
        credentials: &Credentials,
    ) -> ServiceResult<Vec<LoanProduct>> {
        let account = self.get_account(id)?;
        match evaluate_eligibility(&account, credentials) {
            Ok(loans) => Ok(loans),
            Err(err) => {
                warn!(
                    "event=loan_eligibility module=service status=rejected account_id={id} error_code={}",
                    err.kind()
                );
                Err(err.into())
            }
        }
    }

    /// Lists products by stored-credential presence only, without verification.
    pub fn presence_loan_eligibility(&self, id: AccountId) -> ServiceResult<Vec<LoanProduct>> {
        let account = self.get_account(id)?;
        Ok(presence_only_eligibility(&account))
    }
}
