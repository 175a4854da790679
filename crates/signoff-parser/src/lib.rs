//! # signoff-parser
//!
//! Input adapters for the sign-off sheet generator.
//!
//! This crate provides:
//! - Taxonomy documents (JSON) and the bundled default catalogs
//! - Completion data (CSV snapshots) with column and datetime validation
//! - Field extraction from raw task entries into processed snapshots
//! - Snapshot discovery by report period
//!
//! ## Example
//!
//! ```rust
//! use signoff_parser::parse_taxonomy;
//!
//! let json = r#"{
//!     "Production": {
//!         "Weekly": { "description": "Sweep", "columns": ["1.94,1.97", "1.95"] }
//!     }
//! }"#;
//!
//! let taxonomy = parse_taxonomy(json).unwrap();
//! assert_eq!(taxonomy.sections[0].name, "Production");
//! assert_eq!(taxonomy.label_count(), 2);
//! ```

pub mod completion;
pub mod entries;
pub mod snapshot;
pub mod taxonomy;

pub use completion::{load_completion_records, parse_datetime, read_completion_records};
pub use entries::{
    extract_frequency, extract_room, extract_task_type, load_raw_entries, process_entries,
    write_snapshot, RawTaskEntry, TaskRow, UserDirectory,
};
pub use snapshot::{latest_snapshot, snapshot_file_name};
pub use taxonomy::{default_taxonomy_json, load_taxonomy, parse_taxonomy, write_default_configs};

use std::path::PathBuf;

use signoff_core::{ConfigError, ReportPeriod};
use thiserror::Error;

/// Loading or writing an input file failed
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid taxonomy in {path}: {source}")]
    Taxonomy {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("Invalid completion data in {path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No task data files found for {period} in {dir}")]
    NoSnapshot { dir: PathBuf, period: ReportPeriod },

    #[error("No task entries with a location found in {dir}")]
    NoEntries { dir: PathBuf },
}

/// Completion data does not have the expected shape.
///
/// Any of these aborts population for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required columns in CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Completion data is empty")]
    Empty,

    #[error("Row {row}: invalid datetime '{value}'")]
    InvalidDatetime { row: usize, value: String },

    #[error("Row {row}: {message}")]
    MalformedRow { row: usize, message: String },
}
