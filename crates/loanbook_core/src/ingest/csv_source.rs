//! CSV reader producing raw account records.
//!
//! # Invariants
//! - The first line is a header row; header names are trimmed.
//! - Empty cells are omitted so the normalizer sees them as absent.
//! - Cell values are passed through as text; typing happens in normalization.

use crate::error::ErrorKind;
use crate::model::raw::RawRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::path::Path;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug)]
pub struct SourceError {
    origin: String,
    source: csv::Error,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Source
    }

    /// File path or reader label the error came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to read `{}`: {}", self.origin, self.source)
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Reads every data row of a headered CSV file.
pub fn read_csv_records(path: impl AsRef<Path>) -> SourceResult<Vec<RawRecord>> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|source| source_error(&origin, source))?;
    collect_records(reader, &origin)
}

/// Reads every data row from an in-memory or streamed CSV source.
pub fn read_csv_from_reader<R: Read>(reader: R, origin: &str) -> SourceResult<Vec<RawRecord>> {
    let reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    collect_records(reader, origin)
}

fn collect_records<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &str,
) -> SourceResult<Vec<RawRecord>> {
    let headers = reader
        .headers()
        .map_err(|source| source_error(origin, source))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| source_error(origin, source))?;
        records.push(to_raw_record(&headers, &row));
    }

    info!(
        "event=csv_read module=ingest status=ok rows={}",
        records.len()
    );
    Ok(records)
}

fn to_raw_record(headers: &StringRecord, row: &StringRecord) -> RawRecord {
    let mut raw = RawRecord::new();
    for (header, cell) in headers.iter().zip(row.iter()) {
        if header.is_empty() || cell.is_empty() {
            continue;
        }
        raw.insert(header, cell);
    }
    raw
}

fn source_error(origin: &str, source: csv::Error) -> SourceError {
    error!("event=csv_read module=ingest status=error error={source}");
    SourceError {
        origin: origin.to_string(),
        source,
    }
}
