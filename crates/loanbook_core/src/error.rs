//! Error classification shared by every core layer.
//!
//! # Responsibility
//! - Give callers one flat kind to branch on (status codes, exit codes)
//!   without matching nested layer errors.
//!
//! # Invariants
//! - Every public error type in core exposes `kind()`.

use std::fmt::{Display, Formatter};

/// Caller-facing classification of a core failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input field.
    Validation,
    /// Bulk load received zero rows.
    EmptyBatch,
    /// Primary-key collision on insert.
    DuplicateKey,
    /// Required PAN/TAN not presented.
    MissingCredential,
    /// Presented PAN/TAN differs from the stored value.
    CredentialMismatch,
    /// Account type cannot be evaluated for loans.
    InvalidAccountType,
    /// Lookup or delete target does not exist.
    NotFound,
    /// Bulk input could not be read.
    Source,
    /// Underlying storage failure unrelated to business rules.
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::EmptyBatch => "empty_batch",
            Self::DuplicateKey => "duplicate_key",
            Self::MissingCredential => "missing_credential",
            Self::CredentialMismatch => "credential_mismatch",
            Self::InvalidAccountType => "invalid_account_type",
            Self::NotFound => "not_found",
            Self::Source => "source",
            Self::Storage => "storage",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
