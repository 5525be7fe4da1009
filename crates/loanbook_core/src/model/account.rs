//! Account domain model.
//!
//! # Responsibility
//! - Define the canonical account record persisted in `accounts`.
//! - Define the validation error raised while building canonical records.
//!
//! # Invariants
//! - `account_id` is stable and never reassigned to another account.
//! - `balance` is finite and `>= 0`.
//! - `account_name` is non-empty and title-cased.
//! - `balance_category`, when set, agrees with `balance`.

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of an account row.
pub type AccountId = i64;

/// Balance strictly below this value is `low`.
pub const MEDIUM_BALANCE_FLOOR: f64 = 500.0;
/// Balance at or below this value (and not `low`) is `medium`.
pub const HIGH_BALANCE_FLOOR: f64 = 2000.0;

/// Account kind, stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Personal savings account; loan checks use the PAN.
    Saving,
    /// Business current account; loan checks use the TAN.
    Current,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saving => "saving",
            Self::Current => "current",
        }
    }

    /// Parses an already-lowercased type name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "saving" => Some(Self::Saving),
            "current" => Some(Self::Current),
            _ => None,
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse balance bucket tracked by the ETL profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceCategory {
    Low,
    Medium,
    High,
}

impl BalanceCategory {
    /// Buckets a balance: `< 500` low, `500..=2000` medium, `> 2000` high.
    pub fn from_balance(balance: f64) -> Self {
        if balance < MEDIUM_BALANCE_FLOOR {
            Self::Low
        } else if balance <= HIGH_BALANCE_FLOOR {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for BalanceCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical account record, as produced by the normalizer and stored.
///
/// `account_type` is optional only for the ETL profile, which may load rows
/// without a type. Such rows are never eligible for loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub account_name: String,
    pub account_type: Option<AccountType>,
    pub balance: f64,
    pub pan_number: Option<String>,
    pub tan_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_category: Option<BalanceCategory>,
}

impl Account {
    /// Checks storage invariants on an already-built record.
    ///
    /// Used on write and on read-back so invalid rows never leave the store
    /// looking canonical.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.account_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(ValidationError::NonNumericBalance);
        }
        if let Some(category) = self.balance_category {
            if category != BalanceCategory::from_balance(self.balance) {
                return Err(ValidationError::CategoryMismatch {
                    stored: category,
                    balance: self.balance,
                });
            }
        }
        Ok(())
    }
}

/// Malformed input field, raised by the normalizer or by `Account::validate`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is absent or null.
    MissingField(&'static str),
    /// `account_id` is not an integer.
    InvalidAccountId,
    /// `balance` is not a finite number.
    NonNumericBalance,
    /// `account_type` is not `saving` or `current`; carries the rejected value.
    InvalidAccountType(String),
    /// A text field received a non-text, non-number value.
    NotText(&'static str),
    /// Canonical name is empty.
    EmptyName,
    /// Stored category disagrees with the balance it was derived from.
    CategoryMismatch {
        stored: BalanceCategory,
        balance: f64,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::InvalidAccountId => f.write_str("account_id must be an integer"),
            Self::NonNumericBalance => f.write_str("balance must be numeric"),
            Self::InvalidAccountType(_) => f.write_str("invalid account_type"),
            Self::NotText(field) => write!(f, "{field} must be text"),
            Self::EmptyName => f.write_str("account_name must not be empty"),
            Self::CategoryMismatch { stored, balance } => write!(
                f,
                "balance_category `{stored}` does not match balance {balance}"
            ),
        }
    }
}

impl Error for ValidationError {}
