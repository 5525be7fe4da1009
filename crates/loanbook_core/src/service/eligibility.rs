//! Loan eligibility decisions.
//!
//! # Responsibility
//! - Decide which loan products an account qualifies for.
//!
//! # Invariants
//! - Two modes with separate entry points and no shared decision code:
//!   - `evaluate_eligibility` matches caller-presented PAN/TAN against the
//!     stored value (high trust).
//!   - `presence_only_eligibility` only checks that a PAN/TAN is stored
//!     (low trust, bulk reporting).
//! - Empty credential strings count as absent in both modes.
//! - Credential comparison runs in constant time over the bytes.

use crate::error::ErrorKind;
use crate::model::account::{Account, AccountType};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use subtle::ConstantTimeEq;

/// Loan product offered to eligible accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanProduct {
    #[serde(rename = "home loan")]
    HomeLoan,
    #[serde(rename = "car loan")]
    CarLoan,
    #[serde(rename = "education loan")]
    EducationLoan,
    #[serde(rename = "personal loan")]
    PersonalLoan,
    #[serde(rename = "business loan")]
    BusinessLoan,
}

impl LoanProduct {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HomeLoan => "home loan",
            Self::CarLoan => "car loan",
            Self::EducationLoan => "education loan",
            Self::PersonalLoan => "personal loan",
            Self::BusinessLoan => "business loan",
        }
    }
}

impl Display for LoanProduct {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Products for a verified saving account, in display order.
pub const SAVING_LOANS: [LoanProduct; 4] = [
    LoanProduct::HomeLoan,
    LoanProduct::CarLoan,
    LoanProduct::EducationLoan,
    LoanProduct::PersonalLoan,
];

/// Products for a verified current account.
pub const CURRENT_LOANS: [LoanProduct; 1] = [LoanProduct::BusinessLoan];

/// Which credential a decision was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Pan,
    Tan,
}

impl CredentialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Tan => "tan",
        }
    }
}

/// Credentials presented by the caller at query time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub pan_number: Option<String>,
    pub tan_number: Option<String>,
}

impl Credentials {
    pub fn pan(value: impl Into<String>) -> Self {
        Self {
            pan_number: Some(value.into()),
            tan_number: None,
        }
    }

    pub fn tan(value: impl Into<String>) -> Self {
        Self {
            pan_number: None,
            tan_number: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityError {
    MissingCredential(CredentialKind),
    CredentialMismatch(CredentialKind),
    InvalidAccountType,
}

impl EligibilityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::CredentialMismatch(_) => ErrorKind::CredentialMismatch,
            Self::InvalidAccountType => ErrorKind::InvalidAccountType,
        }
    }
}

impl Display for EligibilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential(kind) => write!(f, "{} required", kind.as_str()),
            Self::CredentialMismatch(kind) => write!(f, "{} does not match", kind.as_str()),
            Self::InvalidAccountType => f.write_str("invalid account type"),
        }
    }
}

impl Error for EligibilityError {}

/// Evaluates eligibility by matching presented credentials to stored ones.
///
/// | type    | credential        | result                          |
/// |---------|-------------------|---------------------------------|
/// | saving  | pan absent        | `MissingCredential(Pan)`        |
/// | saving  | pan differs       | `CredentialMismatch(Pan)`       |
/// | saving  | pan matches       | `SAVING_LOANS`                  |
/// | current | tan absent        | `MissingCredential(Tan)`        |
/// | current | tan differs       | `CredentialMismatch(Tan)`       |
/// | current | tan matches       | `CURRENT_LOANS`                 |
/// | none    | any               | `InvalidAccountType`            |
pub fn evaluate_eligibility(
    account: &Account,
    credentials: &Credentials,
) -> Result<Vec<LoanProduct>, EligibilityError> {
    match account.account_type {
        Some(AccountType::Saving) => {
            verify_credential(
                CredentialKind::Pan,
                credentials.pan_number.as_deref(),
                account.pan_number.as_deref(),
            )?;
            Ok(SAVING_LOANS.to_vec())
        }
        Some(AccountType::Current) => {
            verify_credential(
                CredentialKind::Tan,
                credentials.tan_number.as_deref(),
                account.tan_number.as_deref(),
            )?;
            Ok(CURRENT_LOANS.to_vec())
        }
        None => Err(EligibilityError::InvalidAccountType),
    }
}

/// Lists products an account would get if its stored PAN/TAN were trusted.
///
/// Performs no verification; never use it to authorize a loan.
pub fn presence_only_eligibility(account: &Account) -> Vec<LoanProduct> {
    match account.account_type {
        Some(AccountType::Saving) if is_present(account.pan_number.as_deref()) => {
            SAVING_LOANS.to_vec()
        }
        Some(AccountType::Current) if is_present(account.tan_number.as_deref()) => {
            CURRENT_LOANS.to_vec()
        }
        _ => Vec::new(),
    }
}

fn verify_credential(
    kind: CredentialKind,
    presented: Option<&str>,
    stored: Option<&str>,
) -> Result<(), EligibilityError> {
    let presented = match presented {
        Some(value) if is_present(Some(value)) => value,
        _ => return Err(EligibilityError::MissingCredential(kind)),
    };

    let matches = match stored {
        Some(stored) => bool::from(presented.as_bytes().ct_eq(stored.as_bytes())),
        None => false,
    };

    if matches {
        Ok(())
    } else {
        Err(EligibilityError::CredentialMismatch(kind))
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.is_empty())
}
