//! # signoff-core
//!
//! Core domain model for the sign-off sheet generator.
//!
//! This crate provides:
//! - Domain types: `ReportType`, `ReportPeriod`, `Taxonomy`, `Grid`, `CompletionRecord`
//! - The room/frequency normalizer and the room alias table
//! - The taxonomy index that maps (frequency, room) pairs to grid columns
//! - Core traits: `Renderer`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use signoff_core::{normalize, FrequencyGroup, Section, Taxonomy, TaxonomyIndex};
//!
//! let taxonomy = Taxonomy::new(vec![Section::new(
//!     "Production",
//!     vec![FrequencyGroup::new("Weekly", "Sweep floor", ["1.94,1.97", "1.95"])],
//! )]);
//!
//! let index = TaxonomyIndex::build(&taxonomy).unwrap();
//! let target = index.resolve(&normalize("Weekly"), &normalize("1.97")).unwrap();
//! assert_eq!(target.column, 2);
//! ```

pub mod grid;
pub mod index;
pub mod normalize;
pub mod period;
pub mod taxonomy;

pub use grid::{
    column_letter, Border, BorderWeight, Cell, CellAlign, CellRef, CellStyle, Grid, MergedRange,
    Sheet, DATE_COLUMN,
};
pub use index::{ColumnTarget, LookupMiss, TaxonomyIndex};
pub use normalize::{normalize, RoomAliases};
pub use period::{day_label, ReportPeriod, DAY_LABEL_FORMAT};
pub use taxonomy::{FrequencyGroup, LayoutMode, Section, Taxonomy};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Report Type
// ============================================================================

/// Which sign-off sheet a run produces.
///
/// Each type has its own taxonomy document and only accepts completion
/// records whose task type names it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Production,
    Warehouse,
    Idf,
}

impl ReportType {
    /// Every report type, in batch order
    pub const ALL: [ReportType; 3] = [ReportType::Production, ReportType::Warehouse, ReportType::Idf];

    /// Canonical lowercase name, also the task-type key
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Production => "production",
            ReportType::Warehouse => "warehouse",
            ReportType::Idf => "idf",
        }
    }

    /// Capitalized name used in file names and summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportType::Production => "Production",
            ReportType::Warehouse => "Warehouse",
            ReportType::Idf => "Idf",
        }
    }

    /// File name of this type's taxonomy document
    pub fn config_file_name(&self) -> String {
        format!("{}_config.json", self.as_str())
    }

    /// File name of the generated workbook, e.g. `Production_Tasks_Jan2025.xlsx`
    pub fn workbook_file_name(&self, period: ReportPeriod) -> String {
        format!(
            "{}_Tasks_{}{}.xlsx",
            self.display_name(),
            period.month_abbrev(),
            period.year()
        )
    }

    /// File name of the unmatched-record review file
    pub fn unmatched_file_name(&self, period: ReportPeriod) -> String {
        format!(
            "unmatched_tasks_{}_{}_{:02}.txt",
            self.display_name(),
            period.year(),
            period.month()
        )
    }

    /// Whether a record's task-type label belongs to this report
    pub fn matches_task_type(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportType::ALL
            .into_iter()
            .find(|t| t.matches_task_type(s))
            .ok_or_else(|| format!("unknown report type '{s}'"))
    }
}

// ============================================================================
// Completion Record
// ============================================================================

/// One observed "this task was done" event from the source system
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// When the task was completed
    pub timestamp: NaiveDateTime,
    /// Assignee display name
    pub name: String,
    /// Raw room identifier, possibly compound ("1.94,1.97")
    pub room: String,
    /// Raw frequency label ("Weekly", "2x Weekly")
    pub frequency: String,
    /// Raw task-type label ("Production", "IDF")
    pub task_type: String,
}

impl CompletionRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        name: impl Into<String>,
        room: impl Into<String>,
        frequency: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            room: room.into(),
            frequency: frequency.into(),
            task_type: task_type.into(),
        }
    }

    /// Calendar date of the completion
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

// ============================================================================
// Unmatched Entry
// ============================================================================

/// Reason code of an unmatched entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnmatchedKind {
    NoSheetForFrequency,
    NoColumn,
    DateNotFound,
}

impl UnmatchedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmatchedKind::NoSheetForFrequency => "no-sheet-for-frequency",
            UnmatchedKind::NoColumn => "no-column-for-frequency-and-room",
            UnmatchedKind::DateNotFound => "date-not-found",
        }
    }
}

/// A completion record that could not be placed into the grid.
///
/// Frequency and room are kept as they appeared in the record, not
/// normalized, so the review file reads like the source data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnmatchedEntry {
    NoSheetForFrequency { frequency: String },
    NoColumn { frequency: String, room: String },
    DateNotFound { date: String },
}

impl UnmatchedEntry {
    pub fn kind(&self) -> UnmatchedKind {
        match self {
            UnmatchedEntry::NoSheetForFrequency { .. } => UnmatchedKind::NoSheetForFrequency,
            UnmatchedEntry::NoColumn { .. } => UnmatchedKind::NoColumn,
            UnmatchedEntry::DateNotFound { .. } => UnmatchedKind::DateNotFound,
        }
    }
}

impl std::fmt::Display for UnmatchedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmatchedEntry::NoSheetForFrequency { frequency } => {
                write!(f, "No sheet found for frequency '{frequency}'")
            }
            UnmatchedEntry::NoColumn { frequency, room } => {
                write!(f, "No matching column for frequency '{frequency}' and room '{room}'")
            }
            UnmatchedEntry::DateNotFound { date } => write!(f, "Date not found: {date}"),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering of a populated grid
pub trait Renderer {
    type Output;

    /// Render the grid to the output format
    fn render(&self, grid: &Grid) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Taxonomy or run configuration is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Taxonomy has no sections")]
    Empty,

    #[error("Section '{section}' has no frequencies")]
    EmptySection { section: String },

    #[error("'{section}' / '{frequency}' is missing '{field}'")]
    MissingField {
        section: String,
        frequency: String,
        field: &'static str,
    },

    #[error("'{section}' / '{frequency}' has no columns")]
    EmptyColumns { section: String, frequency: String },

    #[error("Duplicate column label '{label}' under '{section}' / '{frequency}'")]
    DuplicateLabel {
        section: String,
        frequency: String,
        label: String,
    },

    #[error("Too many columns: {0} (spreadsheet limit is 16384)")]
    TooManyColumns(usize),

    #[error("Unknown layout '{0}', expected 'per-frequency' or 'combined'")]
    UnknownLayout(String),

    #[error("Invalid report period: {0}")]
    InvalidPeriod(String),

    #[error("Malformed taxonomy: {0}")]
    Malformed(String),
}

/// Rendering or persisting a grid failed
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
