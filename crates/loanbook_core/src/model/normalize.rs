//! Record normalization from raw input to canonical accounts.
//!
//! # Responsibility
//! - Turn one `RawRecord` into one canonical `Account`, or a `ValidationError`.
//!
//! # Invariants
//! - Pure: no I/O, no logging, same input always yields the same output.
//! - Output always passes `Account::validate()`.
//! - Field rules run in a fixed order: name, balance, type, category, credentials.

use crate::model::account::{Account, AccountId, AccountType, BalanceCategory, ValidationError};
use crate::model::raw::RawRecord;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Substitute for a missing or blank `account_name`.
pub const UNKNOWN_ACCOUNT_NAME: &str = "Unknown";

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Alphabetic}+").expect("valid word regex"));

/// Field rules that differ between ingestion contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Reject records without an `account_type`.
    pub require_account_type: bool,
    /// Derive `balance_category` from the normalized balance.
    pub track_balance_category: bool,
}

impl NormalizeOptions {
    /// Single-record API and default bulk loads.
    pub const fn service() -> Self {
        Self {
            require_account_type: true,
            track_balance_category: false,
        }
    }

    /// Standalone ETL loads that bucket balances and tolerate untyped rows.
    pub const fn etl() -> Self {
        Self {
            require_account_type: false,
            track_balance_category: true,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::service()
    }
}

/// Normalizes one raw record into a canonical account.
///
/// # Errors
/// - `MissingField` / `InvalidAccountId` for a bad `account_id`.
/// - `NonNumericBalance` when `balance` cannot be read as a finite number.
/// - `InvalidAccountType` when a present `account_type` is not `saving|current`.
/// - `MissingField("account_type")` when the type is required but absent.
pub fn normalize_record(
    raw: &RawRecord,
    options: NormalizeOptions,
) -> Result<Account, ValidationError> {
    let account_id = parse_account_id(raw)?;

    let account_name = match optional_text(raw, "account_name")? {
        Some(name) if !name.trim().is_empty() => title_case(name.trim()),
        _ => UNKNOWN_ACCOUNT_NAME.to_string(),
    };

    let balance = normalize_balance(raw.get("balance"))?;

    let account_type = match optional_text(raw, "account_type")? {
        Some(value) => {
            let lowered = value.trim().to_lowercase();
            Some(AccountType::parse(&lowered).ok_or(ValidationError::InvalidAccountType(value))?)
        }
        None if options.require_account_type => {
            return Err(ValidationError::MissingField("account_type"));
        }
        None => None,
    };

    let balance_category = options
        .track_balance_category
        .then(|| BalanceCategory::from_balance(balance));

    Ok(Account {
        account_id,
        account_name,
        account_type,
        balance,
        pan_number: optional_text(raw, "pan_number")?,
        tan_number: optional_text(raw, "tan_number")?,
        balance_category,
    })
}

/// Reads `account_id` as an integer from a JSON integer or integer text.
pub fn parse_account_id(raw: &RawRecord) -> Result<AccountId, ValidationError> {
    match raw.get("account_id") {
        None => Err(ValidationError::MissingField("account_id")),
        Some(Value::Number(number)) => number.as_i64().ok_or(ValidationError::InvalidAccountId),
        Some(Value::String(text)) => text
            .trim()
            .parse::<AccountId>()
            .map_err(|_| ValidationError::InvalidAccountId),
        Some(_) => Err(ValidationError::InvalidAccountId),
    }
}

/// Parses a balance and clamps negatives to zero.
pub fn normalize_balance(value: Option<&Value>) -> Result<f64, ValidationError> {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(balance) if balance.is_finite() => Ok(if balance <= 0.0 { 0.0 } else { balance }),
        _ => Err(ValidationError::NonNumericBalance),
    }
}

/// Title-cases every alphabetic run: first letter upper, rest lower.
///
/// `"john doe"` becomes `"John Doe"`, `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(value: &str) -> String {
    WORD_RE
        .replace_all(value, |caps: &Captures<'_>| {
            let mut chars = caps[0].chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .into_owned()
}

fn optional_text(raw: &RawRecord, field: &'static str) -> Result<Option<String>, ValidationError> {
    match raw.get(field) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(ValidationError::NotText(field)),
    }
}
