//! Bulk input sources.
//!
//! # Responsibility
//! - Turn external tabular input into `RawRecord` batches for the bulk loader.

pub mod csv_source;
