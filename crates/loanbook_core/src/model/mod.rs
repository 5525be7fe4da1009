//! Account domain model and input normalization.
//!
//! # Responsibility
//! - Define the canonical account record and its invariants.
//! - Convert raw JSON/CSV records into canonical accounts.
//!
//! # Invariants
//! - Every account is identified by a stable integer `AccountId`.
//! - Nothing outside `normalize` builds accounts from untyped input.

pub mod account;
pub mod normalize;
pub mod raw;
