//! Completion data (processed CSV snapshots).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use signoff_core::CompletionRecord;
use tracing::info;

use crate::{ParseError, ValidationError};

/// Columns a completion file must carry; any others are ignored
pub const REQUIRED_COLUMNS: [&str; 5] = ["Datetime", "Name", "Room Number", "Frequency", "Task Type"];

/// Datetime layout written by the snapshot writer
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct CompletionRow {
    #[serde(rename = "Datetime")]
    datetime: String,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Room Number")]
    room: Option<String>,
    #[serde(rename = "Frequency")]
    frequency: Option<String>,
    #[serde(rename = "Task Type")]
    task_type: Option<String>,
}

/// Parse a completion timestamp.
///
/// Accepts `2025-01-06 14:03:00`, RFC 3339 (`2025-01-06T14:03:00Z`, wall
/// clock kept as written) and a bare date (midnight).
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read completion records from CSV text with a header row
pub fn read_completion_records<R: Read>(reader: R) -> Result<Vec<CompletionRecord>, ValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ValidationError::MalformedRow {
            row: 1,
            message: e.to_string(),
        })?
        .clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ValidationError::Empty);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|required| (*required).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<CompletionRow>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row = row.map_err(|e| ValidationError::MalformedRow {
            row: line,
            message: e.to_string(),
        })?;
        let timestamp =
            parse_datetime(&row.datetime).ok_or_else(|| ValidationError::InvalidDatetime {
                row: line,
                value: row.datetime.clone(),
            })?;
        records.push(CompletionRecord::new(
            timestamp,
            row.name.unwrap_or_default(),
            row.room.unwrap_or_default(),
            row.frequency.unwrap_or_default(),
            row.task_type.unwrap_or_default(),
        ));
    }
    Ok(records)
}

/// Load a completion CSV from disk
pub fn load_completion_records(path: &Path) -> Result<Vec<CompletionRecord>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_completion_records(file).map_err(|source| ParseError::Validation {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = records.len(), "completion data loaded");
    Ok(records)
}
