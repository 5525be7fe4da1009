//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Account::validate()` before persistence.
//! - Repository APIs return semantic errors (`DuplicateKey`) in addition to
//!   DB transport errors.

pub mod account_repo;
